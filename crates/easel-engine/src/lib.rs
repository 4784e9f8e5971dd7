//! Easel engine crate.
//!
//! This crate owns the pieces of the design editor that do not depend on an
//! editing session: geometry, the color model, the gradient compiler, the
//! scene object model, the [`surface::RenderEngine`] capability trait and an
//! in-memory engine with a CPU rasterizer.

pub mod coords;
pub mod input;
pub mod logging;
pub mod paint;
pub mod raster;
pub mod scene;
pub mod surface;
