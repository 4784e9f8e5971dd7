use std::fmt;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::coords::{Rect, Vec2};
use crate::paint::{Paint, Rgb, Stroke};

/// Opaque handle to an object owned by a scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a text object flows its content.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLayout {
    /// Single anchored run with no wrap boundary.
    #[default]
    Point,
    /// Fixed-size box; content wraps and is clipped to the box.
    Area,
    /// Content laid out along the object's baseline path.
    Path,
    /// Fixed width, height grows with content.
    Wrap,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Text payload of a text object. Color lives in the object's fill.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub content: String,
    pub font_family: String,
    /// Font size in logical pixels.
    pub font_size: f32,
    pub font_weight: u16,
    pub italic: bool,
    pub underline: bool,
    pub align: TextAlign,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    pub layout: TextLayout,
}

impl TextBlock {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: "Inter".to_string(),
            font_size: 24.0,
            font_weight: 400,
            italic: false,
            underline: false,
            align: TextAlign::Left,
            line_height: 1.2,
            layout: TextLayout::Point,
        }
    }

    /// Rough extent of a point-text run, used until the host engine measures glyphs.
    pub fn estimated_size(&self) -> Vec2 {
        let longest = self.content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let lines = self.content.lines().count().max(1);
        Vec2::new(
            longest as f32 * self.font_size * 0.55,
            lines as f32 * self.font_size * self.line_height,
        )
    }
}

/// Payload of a scene object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Rect,
    Ellipse,
    Text(TextBlock),
    Image(Arc<RgbaImage>),
}

impl ObjectKind {
    pub const fn name(&self) -> &'static str {
        match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
        }
    }
}

/// An object placed on the design surface.
///
/// `bounds` is the axis-aligned bounding box in surface coordinates; it is
/// also the coordinate space gradients are compiled against.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub bounds: Rect,
    pub fill: Option<Paint>,
    pub stroke: Option<Stroke>,
    /// Can become part of the selection.
    pub selectable: bool,
    /// Receives pointer events (participates in hit testing).
    pub evented: bool,
    /// Skipped by rasterization and never removed by a crop.
    pub export_excluded: bool,
}

impl SceneObject {
    fn with_kind(kind: ObjectKind, bounds: Rect) -> Self {
        Self {
            kind,
            bounds,
            fill: None,
            stroke: None,
            selectable: true,
            evented: true,
            export_excluded: false,
        }
    }

    pub fn rect(bounds: Rect) -> Self {
        Self::with_kind(ObjectKind::Rect, bounds)
    }

    pub fn ellipse(bounds: Rect) -> Self {
        Self::with_kind(ObjectKind::Ellipse, bounds)
    }

    /// Point text anchored at `origin`.
    pub fn point_text(origin: Vec2, block: TextBlock) -> Self {
        let size = block.estimated_size();
        let block = TextBlock { layout: TextLayout::Point, ..block };
        Self::with_kind(ObjectKind::Text(block), Rect::from_origin_size(origin, size))
            .fill(Paint::solid(Rgb::BLACK))
    }

    /// Area text box with a fixed frame.
    pub fn area_text(bounds: Rect, block: TextBlock) -> Self {
        let block = TextBlock { layout: TextLayout::Area, ..block };
        Self::with_kind(ObjectKind::Text(block), bounds).fill(Paint::solid(Rgb::BLACK))
    }

    /// Image at `origin`, sized to the bitmap.
    pub fn image(origin: Vec2, bitmap: Arc<RgbaImage>) -> Self {
        let size = Vec2::new(bitmap.width() as f32, bitmap.height() as f32);
        Self::with_kind(ObjectKind::Image(bitmap), Rect::from_origin_size(origin, size))
    }

    pub fn fill(mut self, paint: Paint) -> Self {
        self.fill = Some(paint);
        self
    }

    pub fn stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Visual-only helper: not selectable, not evented.
    pub fn inert(mut self) -> Self {
        self.selectable = false;
        self.evented = false;
        self
    }

    pub fn export_excluded(mut self, excluded: bool) -> Self {
        self.export_excluded = excluded;
        self
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }

    pub fn text(&self) -> Option<&TextBlock> {
        match &self.kind {
            ObjectKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextBlock> {
        match &mut self.kind {
            ObjectKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Geometric hit test in surface coordinates.
    pub fn contains(&self, p: Vec2) -> bool {
        let b = self.bounds.normalized();
        match self.kind {
            ObjectKind::Ellipse => {
                let r = b.size * 0.5;
                if r.x <= 0.0 || r.y <= 0.0 {
                    return false;
                }
                let d = p - b.center();
                (d.x / r.x).powi(2) + (d.y / r.y).powi(2) <= 1.0
            }
            _ => b.contains(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_hit_test_excludes_corners() {
        let e = SceneObject::ellipse(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(e.contains(Vec2::new(50.0, 25.0)));
        assert!(e.contains(Vec2::new(1.0, 25.0)));
        assert!(!e.contains(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn point_text_is_sized_from_content() {
        let t = SceneObject::point_text(Vec2::new(10.0, 20.0), TextBlock::new("ab\nabcd"));
        assert_eq!(t.bounds.origin, Vec2::new(10.0, 20.0));
        assert!(t.bounds.width() > 0.0);
        assert!((t.bounds.height() - 2.0 * 24.0 * 1.2).abs() < 1e-3);
        assert_eq!(t.text().map(|b| b.layout), Some(TextLayout::Point));
    }

    #[test]
    fn inert_objects_do_not_receive_events() {
        let o = SceneObject::rect(Rect::new(0.0, 0.0, 1.0, 1.0)).inert();
        assert!(!o.selectable && !o.evented);
    }
}
