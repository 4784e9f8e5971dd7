use serde::{Deserialize, Serialize};

use easel_engine::coords::{Rect, Vec2};
use easel_engine::paint::Paint;
use easel_engine::scene::{ObjectId, SceneObject, TextBlock};
use easel_engine::surface::RenderEngine;

use crate::config::EditorConfig;
use crate::event::EventResult;

/// Forced outcome for the text tool, overriding the drag threshold.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    Point,
    Area,
}

/// Pointer-down position of a pending text placement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextDragSession {
    pub start: Vec2,
}

/// What a press/release pair resolves to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Placement {
    /// Single anchored run at the press position.
    Point { origin: Vec2 },
    /// Fixed-size box.
    Area { bounds: Rect },
}

impl Placement {
    /// Decides between point and area text.
    ///
    /// Without `forced`, a release more than `config.text_drag_threshold` away
    /// from the press on either axis is a drag and yields an area box of at
    /// least `config.min_area_text`, anchored at the top-left of the dragged box.
    pub fn resolve(
        start: Vec2,
        end: Vec2,
        forced: Option<TextMode>,
        config: &EditorConfig,
    ) -> Self {
        let delta = (end - start).abs();
        let threshold = config.text_drag_threshold;
        let dragged = delta.x > threshold || delta.y > threshold;

        let area = match forced {
            Some(TextMode::Area) => true,
            Some(TextMode::Point) => false,
            None => dragged,
        };

        if area {
            let size = Vec2::new(
                delta.x.max(config.min_area_text.x),
                delta.y.max(config.min_area_text.y),
            );
            Placement::Area { bounds: Rect::from_origin_size(start.min(end), size) }
        } else {
            Placement::Point { origin: start }
        }
    }
}

/// Click-or-drag text placement state machine.
///
/// `Idle → Pending` on [`begin`](Self::begin), `Pending → Idle` on
/// [`finish`](Self::finish) (always, whatever it creates) or
/// [`cancel`](Self::cancel).
#[derive(Debug, Default)]
pub struct TextPlacement {
    session: Option<TextDragSession>,
}

impl TextPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.session.is_some()
    }

    /// Records the press unless the pointer is over an existing object.
    pub fn begin<E: RenderEngine + ?Sized>(&mut self, engine: &E, pos: Vec2) -> EventResult {
        if engine.hit_test(pos).is_some() {
            return EventResult::Ignored;
        }
        self.session = Some(TextDragSession { start: pos });
        EventResult::Consumed
    }

    /// Resolves the release at `end`, creates the text object and selects it.
    ///
    /// Returns `None` when there was no pending press.
    pub fn finish<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        end: Vec2,
        forced: Option<TextMode>,
        block: TextBlock,
        fill: Paint,
        config: &EditorConfig,
    ) -> Option<ObjectId> {
        let session = self.session.take()?;

        let object = match Placement::resolve(session.start, end, forced, config) {
            Placement::Point { origin } => SceneObject::point_text(origin, block),
            Placement::Area { bounds } => SceneObject::area_text(bounds, block),
        }
        .fill(fill);

        let layout = object.text().map(|t| t.layout);
        log::debug!("text: created {:?} box at {:?}", layout, object.bounds);
        let id = engine.add_object(object);
        engine.set_selection(&[id]);
        engine.request_render();
        Some(id)
    }

    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_engine::paint::Rgb;
    use easel_engine::scene::{Scene, TextLayout};

    fn resolve(dx: f32, dy: f32, forced: Option<TextMode>) -> Placement {
        let start = Vec2::new(100.0, 100.0);
        Placement::resolve(start, start + Vec2::new(dx, dy), forced, &EditorConfig::default())
    }

    // ── resolve ───────────────────────────────────────────────────────────

    #[test]
    fn small_displacement_is_point_text() {
        assert_eq!(resolve(2.0, 1.0, None), Placement::Point { origin: Vec2::new(100.0, 100.0) });
        assert_eq!(resolve(4.0, -4.0, None), Placement::Point { origin: Vec2::new(100.0, 100.0) });
    }

    #[test]
    fn horizontal_drag_is_area_text_with_minimum_size() {
        assert_eq!(
            resolve(10.0, 0.0, None),
            Placement::Area { bounds: Rect::new(100.0, 100.0, 40.0, 24.0) }
        );
    }

    #[test]
    fn area_box_anchors_at_top_left_of_drag() {
        assert_eq!(
            resolve(-120.0, -60.0, None),
            Placement::Area { bounds: Rect::new(-20.0, 40.0, 120.0, 60.0) }
        );
    }

    #[test]
    fn forced_modes_override_displacement() {
        assert_eq!(
            resolve(0.0, 0.0, Some(TextMode::Area)),
            Placement::Area { bounds: Rect::new(100.0, 100.0, 40.0, 24.0) }
        );
        assert_eq!(
            resolve(300.0, 200.0, Some(TextMode::Point)),
            Placement::Point { origin: Vec2::new(100.0, 100.0) }
        );
    }

    #[test]
    fn threshold_comes_from_config() {
        let config = EditorConfig { text_drag_threshold: 20.0, ..EditorConfig::default() };
        let p = Placement::resolve(Vec2::zero(), Vec2::new(15.0, 15.0), None, &config);
        assert!(matches!(p, Placement::Point { .. }));
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn press_release_creates_and_selects_text() {
        let mut scene = Scene::new(400.0, 400.0);
        let mut tool = TextPlacement::new();
        let config = EditorConfig::default();

        assert_eq!(tool.begin(&scene, Vec2::new(10.0, 10.0)), EventResult::Consumed);
        let id = tool
            .finish(&mut scene, Vec2::new(90.0, 60.0), None, TextBlock::new("hi"), Paint::solid(Rgb::BLACK), &config)
            .unwrap();

        let obj = scene.object(id).unwrap();
        assert_eq!(obj.text().map(|t| t.layout), Some(TextLayout::Area));
        assert_eq!(obj.bounds, Rect::new(10.0, 10.0, 80.0, 50.0));
        assert_eq!(scene.selection(), vec![id]);
        assert!(!tool.is_pending());
    }

    #[test]
    fn press_over_object_is_ignored() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.add_object(SceneObject::rect(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let mut tool = TextPlacement::new();
        assert_eq!(tool.begin(&scene, Vec2::new(10.0, 10.0)), EventResult::Ignored);
        let created = tool.finish(
            &mut scene,
            Vec2::new(10.0, 10.0),
            None,
            TextBlock::new("x"),
            Paint::solid(Rgb::BLACK),
            &EditorConfig::default(),
        );
        assert!(created.is_none());
        assert_eq!(scene.len(), 1);
    }
}
