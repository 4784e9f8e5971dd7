//! Capability interface of a rendering engine.
//!
//! The editor core never owns shapes or pixels. It calls into an engine
//! through [`RenderEngine`]: creating and removing objects, reading and
//! writing the selection, assigning fills and strokes, hit testing and
//! rasterizing a region. [`crate::scene::Scene`] is the in-memory engine
//! shipped with this crate.

use image::RgbaImage;

use crate::coords::{Rect, Vec2};
use crate::paint::{Paint, Stroke};
use crate::raster::RasterError;
use crate::scene::{Arrange, ObjectId, SceneObject};

/// Handle for a pointer listener registered against a surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u64);

/// Stroke width used when a paint is assigned to an object without a stroke.
pub const DEFAULT_STROKE_WIDTH: f32 = 1.0;

pub trait RenderEngine {
    /// Inserts an object on top of the current paint order.
    fn add_object(&mut self, object: SceneObject) -> ObjectId;

    /// Removes an object (and drops it from the selection).
    fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject>;

    fn object(&self, id: ObjectId) -> Option<&SceneObject>;

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject>;

    /// All object ids, back to front.
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Currently selected ids, in paint order.
    fn selection(&self) -> Vec<ObjectId>;

    /// Replaces the selection. Unknown or non-selectable ids are ignored.
    fn set_selection(&mut self, ids: &[ObjectId]);

    /// Topmost evented object under `p`.
    fn hit_test(&self, p: Vec2) -> Option<ObjectId>;

    /// Renders `region` (surface coordinates) at `scale` pixels per logical
    /// pixel, skipping export-excluded objects. Fails for regions with no
    /// pixels or too many to allocate.
    fn rasterize(&self, region: Rect, scale: f32) -> Result<RgbaImage, RasterError>;

    /// Changes the layer position of an object.
    fn arrange(&mut self, id: ObjectId, arrange: Arrange);

    /// Schedules a redraw of the surface.
    fn request_render(&mut self);

    fn add_pointer_listener(&mut self) -> ListenerId;

    fn remove_pointer_listener(&mut self, id: ListenerId);

    /// Assigns a fill. Returns false when `id` is unknown.
    fn set_fill(&mut self, id: ObjectId, paint: Paint) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.fill = Some(paint);
                true
            }
            None => false,
        }
    }

    /// Assigns a stroke paint, keeping the current stroke width.
    fn set_stroke(&mut self, id: ObjectId, paint: Paint) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                let width = obj.stroke.as_ref().map_or(DEFAULT_STROKE_WIDTH, |s| s.width);
                obj.stroke = Some(Stroke::new(width, paint));
                true
            }
            None => false,
        }
    }

    fn set_export_excluded(&mut self, id: ObjectId, excluded: bool) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.export_excluded = excluded;
                true
            }
            None => false,
        }
    }
}
