use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorError {
    pub input: String,
}

impl ColorError {
    fn new(input: &str) -> Self {
        Self { input: input.to_string() }
    }
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color `{}` (expected #rgb or #rrggbb)", self.input)
    }
}

impl std::error::Error for ColorError {}

/// Opaque sRGB color with 8 bits per channel.
///
/// There is no alpha channel. Opacity is supplied where the color is used,
/// see [`Rgb::with_alpha`].
///
/// Serializes as a `#rrggbb` string.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb` or `rrggbb`.
    ///
    /// The 3-digit form is expanded by duplicating each digit (`#f80` is
    /// `#ff8800`). Anything else is rejected with a [`ColorError`].
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::new(hex));
        }

        let nibbles: Vec<u8> = digits.bytes().map(hex_value).collect();
        match nibbles.as_slice() {
            [r, g, b] => Ok(Self::new(r * 17, g * 17, b * 17)),
            [r1, r0, g1, g0, b1, b0] => Ok(Self::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
            _ => Err(ColorError::new(hex)),
        }
    }

    /// Formats as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Converts to CMYK percentages.
    ///
    /// `K = 1 - max(R, G, B)`, then C/M/Y are recomputed relative to `1 - K`.
    /// Pure black has no chroma, so C = M = Y = 0 there.
    pub fn to_cmyk(self) -> Cmyk {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let k = 1.0 - r.max(g).max(b);
        if k >= 1.0 {
            return Cmyk::new(0, 0, 0, 100);
        }

        let chroma = |v: f64| (1.0 - v - k) / (1.0 - k);
        Cmyk::new(percent(chroma(r)), percent(chroma(g)), percent(chroma(b)), percent(k))
    }

    /// Attaches an opacity fraction in `[0, 1]` (clamped).
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, alpha)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s.trim())
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

fn percent(v: f64) -> u8 {
    (v * 100.0).round().clamp(0.0, 100.0) as u8
}

/// CMYK color as integer percentages in `[0, 100]`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Cmyk {
    #[inline]
    pub const fn new(c: u8, m: u8, y: u8, k: u8) -> Self {
        Self { c, m, y, k }
    }

    /// Three-component form with no black channel.
    #[inline]
    pub const fn from_cmy(c: u8, m: u8, y: u8) -> Self {
        Self::new(c, m, y, 0)
    }

    /// `channel = round(255 · (1 − X) · (1 − K))`. Percentages above 100 are clamped.
    pub fn to_rgb(self) -> Rgb {
        let frac = |v: u8| v.min(100) as f64 / 100.0;
        let k = frac(self.k);
        let channel = |v: u8| (255.0 * (1.0 - frac(v)) * (1.0 - k)).round() as u8;
        Rgb::new(channel(self.c), channel(self.m), channel(self.y))
    }
}

/// Linear interpolation between two colors.
///
/// Each channel is `round(a + (b − a) · t)`. `t` is not clamped, so values
/// outside `[0, 1]` extrapolate past the endpoints; the result saturates at
/// the channel limits.
pub fn mix(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let lerp = |a: u8, b: u8| {
        let a = a as f64;
        (a + (b as f64 - a) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}

/// String-level [`mix`]: parses both inputs and returns `#rrggbb`.
pub fn mix_hex(a: &str, b: &str, t: f64) -> Result<String, ColorError> {
    Ok(mix(Rgb::from_hex(a)?, Rgb::from_hex(b)?, t).to_hex())
}

/// Formats `hex` with an opacity fraction as `rgba(r,g,b,a)`.
pub fn to_rgba(hex: &str, alpha: f32) -> Result<String, ColorError> {
    Ok(Rgb::from_hex(hex)?.with_alpha(alpha).to_string())
}

/// sRGB color with straight (non-premultiplied) alpha.
///
/// `Display` produces the `rgba(r,g,b,a)` form used for fill and stroke values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f32,
}

impl Rgba {
    #[inline]
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a: a.clamp(0.0, 1.0) }
    }

    #[inline]
    pub fn opaque(rgb: Rgb) -> Self {
        rgb.with_alpha(1.0)
    }

    #[inline]
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Straight-alpha channels as `[r, g, b, a]` in `[0, 1]`.
    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0, self.a]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Rgb { Rgb::from_hex(s).unwrap() }

    // ── hex ───────────────────────────────────────────────────────────────

    #[test]
    fn parses_six_digit_with_and_without_hash() {
        assert_eq!(hex("#1a2b3c"), Rgb::new(0x1a, 0x2b, 0x3c));
        assert_eq!(hex("1A2B3C"), Rgb::new(0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn three_digit_form_duplicates_digits() {
        assert_eq!(hex("#f80"), Rgb::new(0xff, 0x88, 0x00));
        assert_eq!(hex("abc"), hex("#aabbcc"));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        for bad in ["", "#", "#12", "#1234", "#12345g", "+f0000", "#ff00ff00", "#ééé"] {
            assert!(Rgb::from_hex(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn hex_round_trips() {
        for h in ["#000000", "#ffffff", "#0a0b0c", "#7f3e91", "#00ff7f"] {
            assert_eq!(hex(h).to_hex(), h);
        }
    }

    #[test]
    fn channels_are_zero_padded() {
        assert_eq!(Rgb::new(1, 2, 3).to_hex(), "#010203");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Rgb = serde_json::from_str("\"#ff8000\"").unwrap();
        assert_eq!(c, Rgb::new(255, 128, 0));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#ff8000\"");
        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }

    // ── cmyk ──────────────────────────────────────────────────────────────

    #[test]
    fn primaries_to_cmyk() {
        assert_eq!(Rgb::new(255, 0, 0).to_cmyk(), Cmyk::new(0, 100, 100, 0));
        assert_eq!(Rgb::WHITE.to_cmyk(), Cmyk::new(0, 0, 0, 0));
    }

    #[test]
    fn pure_black_has_no_chroma() {
        assert_eq!(Rgb::BLACK.to_cmyk(), Cmyk::new(0, 0, 0, 100));
        assert_eq!(Cmyk::new(0, 0, 0, 100).to_rgb(), Rgb::BLACK);
    }

    #[test]
    fn near_black_is_dominated_by_k() {
        let cmyk = Rgb::new(10, 5, 8).to_cmyk();
        assert_eq!(cmyk.k, 96);
        assert_eq!(cmyk.c, 0);

        let back = cmyk.to_rgb();
        assert!((back.r as i32 - 10).abs() <= 1);
        assert!((back.g as i32 - 5).abs() <= 1);
        assert!((back.b as i32 - 8).abs() <= 1);
    }

    #[test]
    fn cmyk_round_trip_stays_close() {
        for rgb in [
            Rgb::new(255, 0, 0),
            Rgb::new(0, 128, 255),
            Rgb::new(200, 150, 100),
            Rgb::new(12, 200, 37),
            Rgb::new(128, 128, 128),
        ] {
            let back = rgb.to_cmyk().to_rgb();
            for (a, b) in [(rgb.r, back.r), (rgb.g, back.g), (rgb.b, back.b)] {
                assert!((a as i32 - b as i32).abs() <= 2, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn cmy_form_has_zero_black() {
        assert_eq!(Cmyk::from_cmy(0, 100, 100).to_rgb(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn cmyk_percentages_above_100_are_clamped() {
        assert_eq!(Cmyk::new(250, 0, 0, 0).to_rgb(), Rgb::new(0, 255, 255));
    }

    // ── mix ───────────────────────────────────────────────────────────────

    #[test]
    fn mix_with_itself_is_identity() {
        let a = hex("#3c6e91");
        for t in [-1.0, 0.0, 0.25, 0.5, 0.9, 1.0, 2.0] {
            assert_eq!(mix(a, a, t), a);
        }
    }

    #[test]
    fn mix_endpoints_are_exact() {
        let a = hex("#12ab34");
        let b = hex("#fe0199");
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
    }

    #[test]
    fn mix_midpoint_rounds_half_up() {
        assert_eq!(mix(hex("#ff0000"), hex("#0000ff"), 0.5), Rgb::new(128, 0, 128));
    }

    #[test]
    fn mix_extrapolates_and_saturates() {
        let a = hex("#404040");
        let b = hex("#808080");
        assert_eq!(mix(a, b, 1.5), Rgb::new(0xa0, 0xa0, 0xa0));
        assert_eq!(mix(a, b, 10.0), Rgb::WHITE);
        assert_eq!(mix(a, b, -10.0), Rgb::BLACK);
    }

    #[test]
    fn mix_hex_propagates_parse_errors() {
        assert_eq!(mix_hex("#000", "#fff", 1.0).unwrap(), "#ffffff");
        assert!(mix_hex("#000", "zzz", 0.5).is_err());
    }

    // ── rgba ──────────────────────────────────────────────────────────────

    #[test]
    fn rgba_formatting() {
        assert_eq!(to_rgba("#ff0000", 1.0).unwrap(), "rgba(255,0,0,1)");
        assert_eq!(to_rgba("#0000ff", 0.5).unwrap(), "rgba(0,0,255,0.5)");
        assert_eq!(Rgb::new(1, 2, 3).with_alpha(7.0).to_string(), "rgba(1,2,3,1)");
    }
}
