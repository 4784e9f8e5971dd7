use std::sync::Arc;

use easel_engine::coords::{Rect, Vec2};
use easel_engine::paint::{Paint, Rgb, Stroke};
use easel_engine::scene::{ObjectId, SceneObject};
use easel_engine::surface::RenderEngine;

use crate::event::EventResult;

/// State of an in-progress crop drag.
///
/// The overlay is owned by the session: it is created with the session and
/// removed when the session ends, whatever the outcome.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CropSession {
    pub start: Vec2,
    pub current: Vec2,
    pub overlay: ObjectId,
}

impl CropSession {
    /// Signed rectangle from `start` to `current`.
    #[inline]
    pub fn drag_rect(&self) -> Rect {
        Rect::from_drag(self.start, self.current)
    }
}

/// How a crop session ended.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CropOutcome {
    /// The surface contents were replaced by a single image of `region`.
    Replaced { image: ObjectId, region: Rect },
    /// The normalized region had no area or could not be rasterized; the
    /// surface was left untouched.
    Cancelled,
}

/// Drag-to-crop state machine.
///
/// `Idle → Dragging` on [`begin`](Self::begin), `Dragging → Dragging` on
/// [`update`](Self::update), `Dragging → Idle` on [`finish`](Self::finish)
/// or [`cancel`](Self::cancel).
#[derive(Debug, Default)]
pub struct CropTool {
    session: Option<CropSession>,
}

impl CropTool {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    #[inline]
    pub fn session(&self) -> Option<&CropSession> {
        self.session.as_ref()
    }

    /// Starts a drag at `pos` unless the pointer is over an existing object.
    ///
    /// The overlay starts with zero size and is inert and export-excluded,
    /// so it neither intercepts later pointer events nor ends up in the crop.
    pub fn begin<E: RenderEngine + ?Sized>(&mut self, engine: &mut E, pos: Vec2) -> EventResult {
        if self.session.is_some() || engine.hit_test(pos).is_some() {
            return EventResult::Ignored;
        }

        let overlay = engine.add_object(
            SceneObject::rect(Rect::from_origin_size(pos, Vec2::zero()))
                .fill(Paint::Solid(Rgb::new(0x25, 0x63, 0xeb).with_alpha(0.15)))
                .stroke(Stroke::new(1.0, Paint::solid(Rgb::new(0x25, 0x63, 0xeb))))
                .inert()
                .export_excluded(true),
        );
        self.session = Some(CropSession { start: pos, current: pos, overlay });
        log::debug!("crop: drag started at ({}, {})", pos.x, pos.y);
        EventResult::Consumed
    }

    /// Resizes the overlay so its size is `pos - start` (negative toward the upper-left).
    pub fn update<E: RenderEngine + ?Sized>(&mut self, engine: &mut E, pos: Vec2) -> EventResult {
        let Some(session) = self.session.as_mut() else {
            return EventResult::Ignored;
        };
        session.current = pos;
        let rect = session.drag_rect();
        if let Some(overlay) = engine.object_mut(session.overlay) {
            overlay.bounds = rect;
        }
        engine.request_render();
        EventResult::Consumed
    }

    /// Ends the drag and crops to the dragged region.
    ///
    /// `end` is the release position; `None` uses the last tracked position
    /// (explicit finalize). Returns `None` when no drag is active.
    ///
    /// The normalized region is rasterized at `scale`, every exportable object
    /// is removed, and a single image object takes their place at the
    /// region's origin and becomes the selection. A region that cannot be
    /// rasterized ends the drag as [`CropOutcome::Cancelled`].
    pub fn finish<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        end: Option<Vec2>,
        scale: f32,
    ) -> Option<CropOutcome> {
        let mut session = self.session.take()?;
        if let Some(end) = end {
            session.current = end;
        }
        engine.remove_object(session.overlay);

        let region = session.drag_rect().normalized();
        if region.is_empty() {
            log::debug!("crop: zero-area region {:?}, nothing to do", region);
            engine.request_render();
            return Some(CropOutcome::Cancelled);
        }

        let bitmap = match engine.rasterize(region, scale) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                log::warn!("crop: {err}; keeping the surface as is");
                engine.request_render();
                return Some(CropOutcome::Cancelled);
            }
        };

        let exportable: Vec<ObjectId> = engine
            .object_ids()
            .into_iter()
            .filter(|id| engine.object(*id).is_some_and(|o| !o.export_excluded))
            .collect();
        for id in &exportable {
            engine.remove_object(*id);
        }

        let mut object = SceneObject::image(region.origin, Arc::new(bitmap));
        object.bounds = region;
        let image = engine.add_object(object);
        engine.set_selection(&[image]);
        engine.request_render();

        log::info!(
            "crop: replaced {} objects with {}x{} image at ({}, {})",
            exportable.len(),
            region.width(),
            region.height(),
            region.left(),
            region.top()
        );
        Some(CropOutcome::Replaced { image, region })
    }

    /// Abandons the drag and removes the overlay. Returns false when idle.
    pub fn cancel<E: RenderEngine + ?Sized>(&mut self, engine: &mut E) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        engine.remove_object(session.overlay);
        engine.request_render();
        log::debug!("crop: cancelled");
        true
    }
}
