use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::Vec2;

use super::color::{mix, Rgb, Rgba};

/// Gradient family.
///
/// Parsed case-insensitively from a tag. Unknown tags fall back to
/// [`GradientKind::Linear`] instead of failing, so a typo in a caller's tag
/// degrades to a linear gradient.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
    /// Approximated as a radial gradient. There is no angular sweep.
    Conic,
    /// Approximated as a radial gradient with a tighter radius.
    Diamond,
    /// Linear geometry whose ramp returns to the first color at both ends.
    Reflected,
    /// Linear geometry with four fixed stops.
    MultiPoint,
}

impl GradientKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "radial" => GradientKind::Radial,
            "conic" => GradientKind::Conic,
            "diamond" => GradientKind::Diamond,
            "reflected" => GradientKind::Reflected,
            "multi-point" | "multipoint" => GradientKind::MultiPoint,
            _ => GradientKind::Linear,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            GradientKind::Linear => "linear",
            GradientKind::Radial => "radial",
            GradientKind::Conic => "conic",
            GradientKind::Diamond => "diamond",
            GradientKind::Reflected => "reflected",
            GradientKind::MultiPoint => "multi-point",
        }
    }
}

impl From<&str> for GradientKind {
    fn from(tag: &str) -> Self {
        GradientKind::from_tag(tag)
    }
}

impl From<String> for GradientKind {
    fn from(tag: String) -> Self {
        GradientKind::from_tag(&tag)
    }
}

impl From<GradientKind> for String {
    fn from(kind: GradientKind) -> Self {
        kind.tag().to_string()
    }
}

impl fmt::Display for GradientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which paint channel(s) of a target receive the gradient.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyTo {
    #[default]
    Fill,
    Stroke,
    Both,
}

impl ApplyTo {
    #[inline]
    pub const fn fill(self) -> bool {
        matches!(self, ApplyTo::Fill | ApplyTo::Both)
    }

    #[inline]
    pub const fn stroke(self) -> bool {
        matches!(self, ApplyTo::Stroke | ApplyTo::Both)
    }
}

/// Declarative gradient description, as edited in a gradient panel.
///
/// Percentages (`mid`, `opacity`) are in `[0, 100]`; `angle` is in degrees and
/// only affects linear-family geometry. `origin` is a fractional point inside
/// the target's bounding box; when absent, linear families start at the
/// top-left and radial families are centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradientSpec {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub c1: Rgb,
    pub c2: Rgb,
    pub mid: f32,
    pub angle: f32,
    pub opacity: f32,
    pub origin: Option<Vec2>,
    pub aspect_ratio: f32,
    pub reverse: bool,
    pub apply_to: ApplyTo,
}

impl Default for GradientSpec {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            c1: Rgb::BLACK,
            c2: Rgb::WHITE,
            mid: 50.0,
            angle: 0.0,
            opacity: 100.0,
            origin: None,
            aspect_ratio: 1.0,
            reverse: false,
            apply_to: ApplyTo::Fill,
        }
    }
}

impl GradientSpec {
    pub fn new(kind: GradientKind, c1: Rgb, c2: Rgb) -> Self {
        Self { kind, c1, c2, ..Self::default() }
    }

    pub fn mid(mut self, v: f32) -> Self {
        self.mid = v;
        self
    }

    pub fn angle(mut self, v: f32) -> Self {
        self.angle = v;
        self
    }

    pub fn opacity(mut self, v: f32) -> Self {
        self.opacity = v;
        self
    }

    pub fn origin(mut self, v: Vec2) -> Self {
        self.origin = Some(v);
        self
    }

    pub fn aspect_ratio(mut self, v: f32) -> Self {
        self.aspect_ratio = v;
        self
    }

    pub fn reverse(mut self, v: bool) -> Self {
        self.reverse = v;
        self
    }

    pub fn apply_to(mut self, v: ApplyTo) -> Self {
        self.apply_to = v;
        self
    }
}

/// A single gradient stop. `offset` lies in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    #[inline]
    pub const fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Gradient coordinate system in the target's local space (bounding box top-left is `(0, 0)`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GradientGeometry {
    Linear { start: Vec2, end: Vec2 },
    Radial { center: Vec2, r0: f32, r1: f32 },
}

/// Compiled gradient, ready to be assigned as a fill or stroke.
///
/// Stops are sorted by offset (non-decreasing). Each target gets its own
/// compiled value because geometry depends on the target's bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGradient {
    pub geometry: GradientGeometry,
    pub stops: Vec<GradientStop>,
}

impl CompiledGradient {
    /// Returns true when the gradient is structurally usable.
    pub fn is_valid(&self) -> bool {
        let geometry_ok = match self.geometry {
            GradientGeometry::Linear { start, end } => start.is_finite() && end.is_finite(),
            GradientGeometry::Radial { center, r0, r1 } => {
                center.is_finite() && r0.is_finite() && r1.is_finite()
            }
        };
        geometry_ok
            && self.stops.len() >= 2
            && self.stops.iter().all(|s| (0.0..=1.0).contains(&s.offset))
            && self.stops.windows(2).all(|w| w[0].offset <= w[1].offset)
    }

    /// Ramp position of a local-space point, clamped to `[0, 1]`.
    ///
    /// Degenerate geometry (zero-length vector, zero radius) maps everything to 0.
    pub fn position_of(&self, p: Vec2) -> f32 {
        let t = match self.geometry {
            GradientGeometry::Linear { start, end } => {
                let dir = end - start;
                let len2 = dir.dot(dir);
                if len2 <= f32::EPSILON { 0.0 } else { (p - start).dot(dir) / len2 }
            }
            GradientGeometry::Radial { center, r0, r1 } => {
                let span = r1 - r0;
                if span <= f32::EPSILON { 0.0 } else { ((p - center).length() - r0) / span }
            }
        };
        if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
    }

    /// Straight-alpha color at local-space point `p` as `[r, g, b, a]` in `[0, 1]`.
    pub fn color_at(&self, p: Vec2) -> [f32; 4] {
        let t = self.position_of(p);
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return [0.0; 4];
        };
        if t <= first.offset {
            return first.color.to_f32();
        }
        if t >= last.offset {
            return last.color.to_f32();
        }

        for w in self.stops.windows(2) {
            let (a, b) = (w[0], w[1]);
            if t < a.offset || t > b.offset {
                continue;
            }
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color.to_f32();
            }
            let u = (t - a.offset) / span;
            let ca = a.color.to_f32();
            let cb = b.color.to_f32();
            return [
                ca[0] + (cb[0] - ca[0]) * u,
                ca[1] + (cb[1] - ca[1]) * u,
                ca[2] + (cb[2] - ca[2]) * u,
                ca[3] + (cb[3] - ca[3]) * u,
            ];
        }
        last.color.to_f32()
    }
}

const MULTI_POINT_OFFSETS: [f32; 4] = [0.0, 0.35, 0.7, 1.0];

/// Compiles `spec` against a target whose bounding box has size `bbox` (`x` = width, `y` = height).
///
/// Pure: the same inputs always produce the same output.
pub fn compile(spec: &GradientSpec, bbox: Vec2) -> CompiledGradient {
    let (c1, c2) = if spec.reverse { (spec.c2, spec.c1) } else { (spec.c1, spec.c2) };
    let alpha = spec.opacity.clamp(0.0, 100.0) / 100.0;
    let mid = spec.mid.clamp(0.0, 100.0) / 100.0;

    let stop = |offset: f32, rgb: Rgb| GradientStop::new(offset, rgb.with_alpha(alpha));
    let mixed = mix(c1, c2, mid as f64);

    let (geometry, mut stops) = match spec.kind {
        GradientKind::Radial | GradientKind::Conic => (
            radial_geometry(spec, bbox, bbox.x.max(bbox.y) / 2.0),
            vec![stop(0.0, c1), stop(mid, mixed), stop(1.0, c2)],
        ),
        GradientKind::Diamond => (
            radial_geometry(spec, bbox, bbox.x.min(bbox.y) / 2.0 * spec.aspect_ratio),
            vec![stop(0.0, c1), stop(mid, mixed), stop(1.0, c2)],
        ),
        GradientKind::Reflected => (
            linear_geometry(spec, bbox),
            vec![stop(0.0, c1), stop(mid, mixed), stop(1.0 - mid, mixed), stop(1.0, c1)],
        ),
        GradientKind::MultiPoint => (
            linear_geometry(spec, bbox),
            MULTI_POINT_OFFSETS
                .iter()
                .map(|&offset| stop(offset, mix(c1, c2, offset as f64)))
                .collect(),
        ),
        GradientKind::Linear => (
            linear_geometry(spec, bbox),
            vec![stop(0.0, c1), stop(mid, mixed), stop(1.0, c2)],
        ),
    };

    // Reflected stops cross over when mid > 50%.
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    CompiledGradient { geometry, stops }
}

fn radial_geometry(spec: &GradientSpec, bbox: Vec2, r1: f32) -> GradientGeometry {
    let center = spec.origin.unwrap_or(Vec2::new(0.5, 0.5)).scale(bbox);
    GradientGeometry::Radial { center, r0: 0.0, r1 }
}

fn linear_geometry(spec: &GradientSpec, bbox: Vec2) -> GradientGeometry {
    let start = spec.origin.unwrap_or(Vec2::zero()).scale(bbox);
    let rad = spec.angle.to_radians();
    let end = start + Vec2::new(rad.cos() * bbox.x * spec.aspect_ratio, rad.sin() * bbox.y);
    GradientGeometry::Linear { start, end }
}
