//! Coordinate and geometry types shared by the scene, rasterizer and editor tools.
//!
//! Canonical space:
//! - Logical pixels on the design surface
//! - Origin top-left
//! - +X right, +Y down
//!
//! Gradient geometry is expressed in an object's local space, where `(0, 0)`
//! is the top-left of its bounding box.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
