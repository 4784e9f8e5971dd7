//! Scene object model and the in-memory engine.
//!
//! Responsibilities:
//! - describe objects placed on the design surface (shapes, text, images)
//! - keep deterministic paint order (layer + insertion order)
//! - implement [`crate::surface::RenderEngine`] for headless use and tests

mod layer;
mod object;
mod store;

pub use layer::{Layer, PaintKey};
pub use object::{ObjectId, ObjectKind, SceneObject, TextAlign, TextBlock, TextLayout};
pub use store::{Arrange, Scene};
