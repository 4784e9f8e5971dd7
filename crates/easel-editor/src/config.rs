use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use easel_engine::coords::Vec2;
use easel_engine::paint::Rgb;

/// Error returned when an [`EditorConfig`] cannot be read or parsed.
#[derive(Debug, Clone)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Tunables for the editing tools.
///
/// Every field has a default, so a JSON file only needs the keys it overrides:
///
/// ```json
/// { "text_drag_threshold": 6, "image_cascade": { "x": 32, "y": 32 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// A text-tool release further than this (on either axis) from the press creates an area box.
    pub text_drag_threshold: f32,
    /// Minimum size of an area text box.
    pub min_area_text: Vec2,
    /// Content of newly created text objects.
    pub default_text: String,
    /// Where the first image of a batch lands when no position is given.
    pub image_position: Vec2,
    /// Offset between consecutive images of one batch.
    pub image_cascade: Vec2,
    /// Pixels per logical pixel when a crop is rasterized.
    pub crop_scale: f32,
    /// Initial session fill color.
    pub fill_color: Rgb,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            text_drag_threshold: 4.0,
            min_area_text: Vec2::new(40.0, 24.0),
            default_text: "Your text here".to_string(),
            image_position: Vec2::new(40.0, 40.0),
            image_cascade: Vec2::new(24.0, 24.0),
            crop_scale: 1.0,
            fill_color: Rgb::new(0x3b, 0x82, 0xf6),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(src).map_err(|e| ConfigError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&src)
    }
}
