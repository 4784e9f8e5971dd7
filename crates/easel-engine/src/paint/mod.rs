//! Paint model shared by the scene, rasterizer and editor.
//!
//! Scope:
//! - color representation (8-bit sRGB, CMYK percentages, straight-alpha RGBA)
//! - gradient specification and compilation
//! - paint sources assigned to object fills and strokes
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod gradient;

pub use color::{mix, mix_hex, to_rgba, Cmyk, ColorError, Rgb, Rgba};
pub use gradient::{
    compile, ApplyTo, CompiledGradient, GradientGeometry, GradientKind, GradientSpec, GradientStop,
};

/// Paint source for a fill or stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Gradient(CompiledGradient),
}

impl Paint {
    #[inline]
    pub fn solid(color: Rgb) -> Self {
        Paint::Solid(Rgba::opaque(color))
    }

    /// Value as understood by a canvas-style engine: `rgba(...)` for solids,
    /// the kind of geometry for gradients.
    pub fn describe(&self) -> String {
        match self {
            Paint::Solid(c) => c.to_string(),
            Paint::Gradient(g) => {
                let kind = match g.geometry {
                    GradientGeometry::Linear { .. } => "linear",
                    GradientGeometry::Radial { .. } => "radial",
                };
                format!("{kind}-gradient({} stops)", g.stops.len())
            }
        }
    }
}

/// Stroke drawn along the outer edge of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub paint: Paint,
}

impl Stroke {
    #[inline]
    pub fn new(width: f32, paint: Paint) -> Self {
        Self { width, paint }
    }
}
