use easel_engine::paint::{GradientSpec, Rgb};
use easel_engine::surface::ListenerId;

use crate::config::EditorConfig;
use crate::text_style::TextStyle;
use crate::tools::{TextMode, Tool};

/// Per-editor session state.
///
/// Owned by [`crate::editor::Editor`]; nothing here is shared between editors.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    pub tool: Tool,
    /// Color assigned by the last fill change, used for new shapes.
    pub fill_color: Rgb,
    /// Last gradient applied through the editor.
    pub gradient: Option<GradientSpec>,
    /// Style carried onto newly placed text.
    pub text_style: TextStyle,
    /// Forced outcome of the text tool, `None` for click-or-drag.
    pub text_mode: Option<TextMode>,
    /// Pointer listener registered on the surface while attached.
    pub listener: Option<ListenerId>,
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            tool: Tool::default(),
            fill_color: config.fill_color,
            gradient: None,
            text_style: TextStyle::default(),
            text_mode: None,
            listener: None,
        }
    }
}
