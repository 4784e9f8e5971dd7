//! CPU rasterizer for the in-memory scene, drawn with `tiny-skia`.
//!
//! Convention:
//! - a region in surface coordinates maps onto an image of
//!   `round(region.size * scale)` pixels
//! - shapes are filled and stroked anti-aliased, strokes are centered on the outline
//! - output is straight-alpha RGBA8
//!
//! Text objects are not rasterized here. Glyph shaping and font loading belong
//! to the host engine.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LinearGradient, Pattern, Pixmap, Point, RadialGradient,
    Shader, SpreadMode, Transform,
};

use crate::coords::{Rect, Vec2};
use crate::paint::{CompiledGradient, GradientGeometry, Paint, Rgb, Rgba};
use crate::scene::{ObjectKind, SceneObject};

/// Largest output the rasterizer will allocate, in pixels (256 MiB of RGBA).
pub const MAX_PIXELS: u64 = 1 << 26;

/// Why a region could not be rasterized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterError {
    /// The scaled region rounds to zero pixels on at least one axis.
    EmptyRegion { width: f32, height: f32 },
    /// The scaled region exceeds [`MAX_PIXELS`] or could not be allocated.
    TooLarge { width: f32, height: f32 },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::EmptyRegion { width, height } => {
                write!(f, "raster region {width}x{height} has no pixels")
            }
            RasterError::TooLarge { width, height } => {
                write!(f, "raster region {width}x{height} exceeds {MAX_PIXELS} pixels")
            }
        }
    }
}

impl std::error::Error for RasterError {}

/// Output pixel layout, cast to raw bytes for `image`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
struct Pixel {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<ColorU8> for Pixel {
    fn from(c: ColorU8) -> Self {
        Self { r: c.red(), g: c.green(), b: c.blue(), a: c.alpha() }
    }
}

/// Renders `objects` (back-to-front) inside `region` at `scale`.
///
/// Export-excluded objects are skipped. A non-finite or non-positive scale
/// falls back to 1.
pub fn rasterize<'a>(
    background: Option<Rgb>,
    objects: impl IntoIterator<Item = &'a SceneObject>,
    region: Rect,
    scale: f32,
) -> Result<RgbaImage, RasterError> {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let region = region.normalized();
    let mut pixmap = allocate(region, scale)?;

    if let Some(bg) = background {
        pixmap.fill(Color::from_rgba8(bg.r, bg.g, bg.b, 255));
    }

    let view = Transform::from_translate(-region.left(), -region.top()).post_scale(scale, scale);
    for obj in objects.into_iter().filter(|o| !o.export_excluded && !o.is_text()) {
        draw_object(&mut pixmap, obj, view);
    }

    Ok(into_image(&pixmap))
}

fn allocate(region: Rect, scale: f32) -> Result<Pixmap, RasterError> {
    let width = (region.width() * scale).round();
    let height = (region.height() * scale).round();
    if !(width >= 1.0 && height >= 1.0) {
        return Err(RasterError::EmptyRegion { width, height });
    }

    let too_large = RasterError::TooLarge { width, height };
    if width as f64 * height as f64 > MAX_PIXELS as f64 {
        return Err(too_large);
    }
    Pixmap::new(width as u32, height as u32).ok_or(too_large)
}

fn into_image(pixmap: &Pixmap) -> RgbaImage {
    let pixels: Vec<Pixel> = pixmap.pixels().iter().map(|p| Pixel::from(p.demultiply())).collect();
    let bytes: Vec<u8> = bytemuck::cast_slice(&pixels).to_vec();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), bytes)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

fn draw_object(pixmap: &mut Pixmap, obj: &SceneObject, view: Transform) {
    let bounds = obj.bounds.normalized();
    let (x, y, w, h) = (bounds.left(), bounds.top(), bounds.width(), bounds.height());
    let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) else {
        return;
    };
    let path = match obj.kind {
        ObjectKind::Ellipse => match tiny_skia::PathBuilder::from_oval(rect) {
            Some(path) => path,
            None => return,
        },
        _ => tiny_skia::PathBuilder::from_rect(rect),
    };
    // Paint geometry lives in the object's local space.
    let local = Transform::from_translate(bounds.left(), bounds.top());

    match &obj.kind {
        ObjectKind::Image(bitmap) => {
            let Some(texture) = to_pixmap(bitmap) else {
                return;
            };
            let sx = bounds.width() / texture.width() as f32;
            let sy = bounds.height() / texture.height() as f32;
            let mut paint = tiny_skia::Paint::default();
            paint.shader = Pattern::new(
                texture.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::from_scale(sx, sy).post_concat(local),
            );
            pixmap.fill_path(&path, &paint, FillRule::Winding, view, None);
        }
        _ => {
            if let Some(fill) = &obj.fill {
                let paint = skia_paint(fill, local);
                pixmap.fill_path(&path, &paint, FillRule::Winding, view, None);
            }
        }
    }

    if let Some(stroke) = obj.stroke.as_ref().filter(|s| s.width > 0.0) {
        let paint = skia_paint(&stroke.paint, local);
        let style = tiny_skia::Stroke { width: stroke.width, ..Default::default() };
        pixmap.stroke_path(&path, &paint, &style, view, None);
    }
}

fn skia_color(c: Rgba) -> Color {
    let a = (c.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::from_rgba8(c.r, c.g, c.b, a)
}

fn skia_paint(paint: &Paint, local: Transform) -> tiny_skia::Paint<'static> {
    let mut out = tiny_skia::Paint::default();
    out.anti_alias = true;
    out.shader = match paint {
        Paint::Solid(c) => Shader::SolidColor(skia_color(*c)),
        Paint::Gradient(g) => gradient_shader(g, local),
    };
    out
}

/// Maps a compiled gradient onto a `tiny-skia` shader with pad spread.
///
/// Degenerate geometry falls back to the first stop, which is where
/// [`CompiledGradient::position_of`] puts every point.
fn gradient_shader(g: &CompiledGradient, local: Transform) -> Shader<'static> {
    let fallback = g.stops.first().map_or(Color::TRANSPARENT, |s| skia_color(s.color));
    let point = |v: Vec2| Point::from_xy(v.x, v.y);

    let shader = match g.geometry {
        GradientGeometry::Linear { start, end } => {
            let stops = g
                .stops
                .iter()
                .map(|s| tiny_skia::GradientStop::new(s.offset, skia_color(s.color)))
                .collect();
            LinearGradient::new(point(start), point(end), stops, SpreadMode::Pad, local)
        }
        GradientGeometry::Radial { center, r0, r1 } if r1 > r0 && r1 > 0.0 => {
            // tiny-skia radial gradients start at radius zero, so stops are
            // moved outward by the inner radius.
            let stops = g
                .stops
                .iter()
                .map(|s| {
                    let offset = (r0 + s.offset * (r1 - r0)) / r1;
                    tiny_skia::GradientStop::new(offset, skia_color(s.color))
                })
                .collect();
            let c = point(center);
            RadialGradient::new(c, c, r1, stops, SpreadMode::Pad, local)
        }
        GradientGeometry::Radial { .. } => None,
    };
    shader.unwrap_or(Shader::SolidColor(fallback))
}

/// Copies a straight-alpha bitmap into a premultiplied pixmap.
fn to_pixmap(bitmap: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(bitmap.width(), bitmap.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(bitmap.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
