//! Pointer-driven editing tools.
//!
//! Each tool is a small state machine that talks to the surface only through
//! [`easel_engine::surface::RenderEngine`]. Routing pointer events to the
//! active tool is the editor's job.

pub mod crop;
pub mod text;

pub use crop::{CropOutcome, CropSession, CropTool};
pub use text::{Placement, TextDragSession, TextMode, TextPlacement};

use serde::{Deserialize, Serialize};

/// Tool receiving pointer input on the surface.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Click to select objects.
    #[default]
    Select,
    /// Drag out a region to crop the design to.
    Crop,
    /// Click for point text, drag for an area text box.
    Text,
}
