//! Built-in design templates.
//!
//! Templates are JSON documents embedded in the crate. Each is a flat list of
//! rect, ellipse and text items in template-local coordinates:
//!
//! ```json
//! { "id": "badge", "name": "Badge", "items": [
//!     { "kind": "ellipse", "x": 0, "y": 0, "width": 200, "height": 200, "fill": "#f97316" },
//!     { "kind": "text", "x": 44, "y": 72, "content": "SALE", "fontSize": 48 }
//! ] }
//! ```
//!
//! Text items with both `width` and `height` become area text; otherwise point text.

use std::fmt;

use serde::Deserialize;

use easel_engine::coords::{Rect, Vec2};
use easel_engine::paint::{compile, GradientSpec, Paint, Rgb, Stroke};
use easel_engine::scene::{SceneObject, TextBlock};
use easel_engine::surface::DEFAULT_STROKE_WIDTH;

use crate::text_style::TextStyle;

const BUILTIN: &str = include_str!("../templates/builtin.json");

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// No template with this id.
    Unknown(String),
    /// The template document could not be parsed.
    Malformed(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Unknown(id) => write!(f, "unknown template '{id}'"),
            TemplateError::Malformed(msg) => write!(f, "malformed template document: {msg}"),
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeItem {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub fill: Option<Rgb>,
    /// Takes precedence over `fill` (or stroke, per its `applyTo`).
    #[serde(default)]
    pub gradient: Option<GradientSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    pub content: String,
    #[serde(default)]
    pub fill: Option<Rgb>,
    #[serde(flatten)]
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TemplateItem {
    Rect(ShapeItem),
    Ellipse(ShapeItem),
    Text(TextItem),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub items: Vec<TemplateItem>,
}

impl Template {
    /// Builds the template's objects with their local origin at `at`.
    pub fn instantiate(&self, at: Vec2) -> Vec<SceneObject> {
        self.items.iter().map(|item| item.build(at)).collect()
    }
}

impl TemplateItem {
    fn build(&self, at: Vec2) -> SceneObject {
        match self {
            TemplateItem::Rect(s) => s.build(SceneObject::rect(s.bounds(at))),
            TemplateItem::Ellipse(s) => s.build(SceneObject::ellipse(s.bounds(at))),
            TemplateItem::Text(t) => {
                let mut block = TextBlock::new(t.content.clone());
                t.style.apply_to_block(&mut block);

                let origin = at + Vec2::new(t.x, t.y);
                let mut object = match (t.width, t.height) {
                    (Some(w), Some(h)) => {
                        let bounds = Rect::from_origin_size(origin, Vec2::new(w, h));
                        SceneObject::area_text(bounds, block)
                    }
                    _ => SceneObject::point_text(origin, block),
                };
                if let Some(color) = t.fill.or(t.style.color) {
                    object.fill = Some(Paint::solid(color));
                }
                object
            }
        }
    }
}

impl ShapeItem {
    fn bounds(&self, at: Vec2) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height).translated(at)
    }

    fn build(&self, mut object: SceneObject) -> SceneObject {
        object.fill = self.fill.map(Paint::solid);
        if let Some(spec) = &self.gradient {
            let compiled = compile(spec, object.bounds.size);
            if spec.apply_to.fill() {
                object.fill = Some(Paint::Gradient(compiled.clone()));
            }
            if spec.apply_to.stroke() {
                object.stroke = Some(Stroke::new(DEFAULT_STROKE_WIDTH, Paint::Gradient(compiled)));
            }
        }
        object
    }
}

/// Set of templates available to an editor, looked up by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    pub fn from_json(src: &str) -> Result<Self, TemplateError> {
        let templates: Vec<Template> =
            serde_json::from_str(src).map_err(|e| TemplateError::Malformed(e.to_string()))?;
        Ok(Self { templates })
    }

    /// Templates shipped with the crate.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN) {
            Ok(lib) => lib,
            Err(e) => {
                log::error!("templates: built-in library failed to load: {e}");
                Self::default()
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<&Template, TemplateError> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TemplateError::Unknown(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
