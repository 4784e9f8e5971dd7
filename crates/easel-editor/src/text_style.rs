use serde::{Deserialize, Serialize};

use easel_engine::paint::{Paint, Rgb};
use easel_engine::scene::{SceneObject, TextAlign, TextBlock};

/// Partial text style. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub align: Option<TextAlign>,
    pub line_height: Option<f32>,
    pub color: Option<Rgb>,
}

impl TextStyle {
    pub fn is_empty(&self) -> bool {
        *self == TextStyle::default()
    }

    /// Overlays `other` on top of `self`: fields set in `other` win.
    pub fn merge(&mut self, other: &TextStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })*
            };
        }
        take!(font_family, font_size, font_weight, italic, underline, align, line_height, color);
    }

    /// Writes the set fields into a text block. Color is not part of the block.
    pub fn apply_to_block(&self, block: &mut TextBlock) {
        if let Some(family) = &self.font_family {
            block.font_family = family.clone();
        }
        if let Some(size) = self.font_size.filter(|s| s.is_finite() && *s > 0.0) {
            block.font_size = size;
        }
        if let Some(weight) = self.font_weight {
            block.font_weight = weight.clamp(100, 900);
        }
        if let Some(italic) = self.italic {
            block.italic = italic;
        }
        if let Some(underline) = self.underline {
            block.underline = underline;
        }
        if let Some(align) = self.align {
            block.align = align;
        }
        if let Some(lh) = self.line_height.filter(|l| l.is_finite() && *l > 0.0) {
            block.line_height = lh;
        }
    }

    /// Applies the style to a text object. Returns false for non-text objects.
    pub fn apply_to(&self, object: &mut SceneObject) -> bool {
        let Some(block) = object.text_mut() else {
            return false;
        };
        self.apply_to_block(block);
        if let Some(color) = self.color {
            object.fill = Some(Paint::solid(color));
        }
        true
    }
}
