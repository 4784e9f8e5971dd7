use easel_engine::coords::Vec2;
use easel_engine::paint::{ColorError, GradientSpec};
use easel_engine::scene::{ObjectId, TextLayout};

use crate::images::ImageSource;
use crate::templates::TemplateError;
use crate::text_style::TextStyle;
use crate::tools::CropOutcome;

/// Operations a host shell (toolbars, panels, shortcuts) drives the editor with.
///
/// Selection-based operations act on the current selection and are no-ops when
/// it is empty. Counts returned are the number of objects changed.
pub trait EditorHandle {
    /// Parses `hex`, remembers it as the session color and fills the selection with it.
    fn set_fill_color(&mut self, hex: &str) -> Result<(), ColorError>;

    /// Compiles `spec` against each selected object's own bounds and assigns
    /// it to fill, stroke or both.
    fn apply_gradient(&mut self, spec: &GradientSpec) -> usize;

    /// Inserts a built-in template; its objects become the selection.
    fn insert_template(&mut self, id: &str) -> Result<Vec<ObjectId>, TemplateError>;

    /// Starts loading `items`. Item `i` lands at `position + i * cascade`
    /// (configured defaults when `position` is `None`) once it has loaded.
    fn add_images(&mut self, items: Vec<ImageSource>, position: Option<Vec2>);

    /// Ends an active crop drag at its last position. `None` when no crop is active.
    fn finalize_crop(&mut self) -> Option<CropOutcome>;

    fn apply_text_style(&mut self, style: &TextStyle) -> usize;

    fn apply_text_layout(&mut self, layout: TextLayout) -> usize;
}
