//! Easel editor: an editing session on top of `easel-engine`.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use easel_editor::prelude::*;
//!
//! let scene = Scene::new(800.0, 600.0);
//! let mut editor = Editor::new(scene, EditorConfig::default(), tokio::runtime::Handle::current());
//!
//! editor.insert_template("title-card")?;
//! editor.apply_gradient(&GradientSpec::new(GradientKind::Radial, c1, c2));
//!
//! // Feed pointer/keyboard input from the host shell:
//! editor.set_tool(Tool::Crop);
//! editor.handle_event(&InputEvent::pointer_down(Vec2::new(50.0, 50.0)));
//! editor.handle_event(&InputEvent::pointer_up(Vec2::new(150.0, 120.0)));
//!
//! let scene = editor.detach();
//! ```
//!
//! The editor never owns pixels or shapes itself: everything goes through
//! [`easel_engine::surface::RenderEngine`], so any engine implementing it can
//! sit underneath.

pub mod config;
pub mod editor;
pub mod event;
pub mod handle;
pub mod images;
pub mod session;
pub mod templates;
pub mod text_style;
pub mod tools;

pub use editor::Editor;
pub use handle::EditorHandle;

/// Common imports for hosts driving an editor.
pub mod prelude {
    pub use crate::config::{ConfigError, EditorConfig};
    pub use crate::editor::Editor;
    pub use crate::event::EventResult;
    pub use crate::handle::EditorHandle;
    pub use crate::images::{ImageLoadError, ImageSource};
    pub use crate::templates::{TemplateError, TemplateLibrary};
    pub use crate::text_style::TextStyle;
    pub use crate::tools::{CropOutcome, TextMode, Tool};

    pub use easel_engine::coords::{Rect, Vec2};
    pub use easel_engine::input::{InputEvent, Key};
    pub use easel_engine::paint::{ApplyTo, Cmyk, GradientKind, GradientSpec, Rgb};
    pub use easel_engine::scene::{Arrange, ObjectId, Scene, TextLayout};
    pub use easel_engine::surface::RenderEngine;
}
