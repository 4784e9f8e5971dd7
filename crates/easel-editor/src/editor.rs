use std::sync::Arc;

use tokio::runtime::Handle;

use easel_engine::coords::Vec2;
use easel_engine::input::{
    InputEvent, InputState, Key, KeyState, Modifiers, MouseButton, MouseButtonState,
    PointerButtonEvent,
};
use easel_engine::paint::{compile, Cmyk, ColorError, GradientSpec, Paint, Rgb};
use easel_engine::scene::{Arrange, ObjectId, SceneObject, TextBlock, TextLayout};
use easel_engine::surface::RenderEngine;

use crate::config::EditorConfig;
use crate::event::EventResult;
use crate::handle::EditorHandle;
use crate::images::{ImageLoader, ImageSource, LoadedImage};
use crate::session::EditorSession;
use crate::templates::{TemplateError, TemplateLibrary};
use crate::text_style::TextStyle;
use crate::tools::{CropOutcome, CropTool, TextMode, TextPlacement, Tool};

/// Editing session bound to one render engine.
///
/// The editor owns the engine for its lifetime and is the only thing that
/// mutates it. Input arrives through [`handle_event`](Self::handle_event),
/// shell commands through [`EditorHandle`]. Finished image loads are applied
/// when the owner calls [`pump_images`](Self::pump_images) or
/// [`settle_images`](Self::settle_images).
///
/// [`detach`](Self::detach) tears the session down and hands the engine back.
#[derive(Debug)]
pub struct Editor<E: RenderEngine> {
    engine: E,
    config: EditorConfig,
    session: EditorSession,
    input: InputState,
    crop: CropTool,
    text: TextPlacement,
    images: ImageLoader,
    templates: TemplateLibrary,
}

impl<E: RenderEngine> Editor<E> {
    /// Attaches to `engine` and registers a pointer listener on it.
    /// Image loads are spawned on `runtime`.
    pub fn new(mut engine: E, config: EditorConfig, runtime: Handle) -> Self {
        let mut session = EditorSession::new(&config);
        session.listener = Some(engine.add_pointer_listener());
        log::debug!("editor: attached (listener {:?})", session.listener);

        Self {
            engine,
            session,
            input: InputState::default(),
            crop: CropTool::new(),
            text: TextPlacement::new(),
            images: ImageLoader::new(runtime),
            templates: TemplateLibrary::builtin(),
            config,
        }
    }

    /// Replaces the template library used by [`EditorHandle::insert_template`].
    pub fn with_templates(mut self, templates: TemplateLibrary) -> Self {
        self.templates = templates;
        self
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[inline]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[inline]
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[inline]
    pub fn tool(&self) -> Tool {
        self.session.tool
    }

    #[inline]
    pub fn crop_tool(&self) -> &CropTool {
        &self.crop
    }

    /// Image loads still pending.
    #[inline]
    pub fn pending_images(&self) -> usize {
        self.images.in_flight()
    }

    /// Switches the active tool. Any drag in progress is cancelled and
    /// in-flight image loads are discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.session.tool {
            return;
        }
        self.cancel_drags();
        self.images.cancel();
        log::debug!("editor: tool {:?} -> {:?}", self.session.tool, tool);
        self.session.tool = tool;
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Routes one input event to the active tool.
    ///
    /// A second press without a release, or a release whose press never
    /// reached the editor, is ignored.
    pub fn handle_event(&mut self, ev: &InputEvent) -> EventResult {
        let tracked = self.input.apply_event(ev);

        match ev {
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state,
                pos,
                modifiers,
            }) => match state {
                _ if !tracked => {
                    log::trace!("editor: unmatched {:?} at {:?}", state, pos);
                    EventResult::Ignored
                }
                MouseButtonState::Pressed => self.pointer_down(*pos, *modifiers),
                MouseButtonState::Released => self.pointer_up(*pos),
            },

            InputEvent::PointerMoved(m) => match self.session.tool {
                Tool::Crop => self.crop.update(&mut self.engine, m.pos),
                _ => EventResult::Ignored,
            },

            InputEvent::Key { key, state: KeyState::Pressed, .. } => match key {
                Key::Escape if self.cancel_drags() => EventResult::Consumed,
                Key::Enter if self.finalize_crop().is_some() => EventResult::Consumed,
                Key::Delete | Key::Backspace if self.delete_selection() > 0 => {
                    EventResult::Consumed
                }
                _ => EventResult::Ignored,
            },

            InputEvent::Focused(false) => {
                self.cancel_drags();
                EventResult::Ignored
            }

            _ => EventResult::Ignored,
        }
    }

    fn pointer_down(&mut self, pos: Vec2, modifiers: Modifiers) -> EventResult {
        match self.session.tool {
            Tool::Select => self.select_at(pos, modifiers.shift),
            Tool::Crop => self.crop.begin(&mut self.engine, pos),
            Tool::Text => self.text.begin(&self.engine, pos),
        }
    }

    fn pointer_up(&mut self, pos: Vec2) -> EventResult {
        match self.session.tool {
            Tool::Select => EventResult::Ignored,
            Tool::Crop => {
                let scale = self.config.crop_scale;
                match self.crop.finish(&mut self.engine, Some(pos), scale) {
                    Some(_) => EventResult::Consumed,
                    None => EventResult::Ignored,
                }
            }
            Tool::Text => {
                let mut block = TextBlock::new(self.config.default_text.clone());
                self.session.text_style.apply_to_block(&mut block);
                let fill = Paint::solid(self.session.text_style.color.unwrap_or(Rgb::BLACK));

                let forced = self.session.text_mode;
                match self.text.finish(&mut self.engine, pos, forced, block, fill, &self.config) {
                    Some(_) => EventResult::Consumed,
                    None => EventResult::Ignored,
                }
            }
        }
    }

    fn select_at(&mut self, pos: Vec2, extend: bool) -> EventResult {
        let hit = self.engine.hit_test(pos);
        let mut selection = if extend { self.engine.selection() } else { Vec::new() };

        match hit {
            Some(id) if extend && selection.contains(&id) => selection.retain(|s| *s != id),
            Some(id) => selection.push(id),
            None if extend => return EventResult::Ignored,
            None => {}
        }
        self.engine.set_selection(&selection);
        self.engine.request_render();

        if hit.is_some() { EventResult::Consumed } else { EventResult::Ignored }
    }

    /// Cancels a crop or text drag in progress. Returns false when none was active.
    pub fn cancel_drags(&mut self) -> bool {
        let crop = self.crop.cancel(&mut self.engine);
        let text = self.text.cancel();
        crop || text
    }

    // ── selection commands ────────────────────────────────────────────────

    /// Removes every selected object. Returns how many were removed.
    pub fn delete_selection(&mut self) -> usize {
        let ids = self.engine.selection();
        for id in &ids {
            self.engine.remove_object(*id);
        }
        if !ids.is_empty() {
            log::debug!("editor: deleted {} objects", ids.len());
            self.engine.request_render();
        }
        ids.len()
    }

    /// Moves the selection in paint order, keeping its relative order.
    pub fn arrange(&mut self, arrange: Arrange) {
        let mut ids = self.engine.selection();
        if ids.is_empty() {
            log::debug!("editor: arrange {:?} with empty selection", arrange);
            return;
        }
        let order = self.engine.object_ids();
        ids.sort_by_key(|id| order.iter().position(|o| o == id));
        // Forward and ToBack start from the front-most object so selected
        // neighbours never swap with each other.
        if matches!(arrange, Arrange::Forward | Arrange::ToBack) {
            ids.reverse();
        }
        for id in ids {
            self.engine.arrange(id, arrange);
        }
        self.engine.request_render();
    }

    /// Fills the selection with a CMYK color. See [`EditorHandle::set_fill_color`].
    pub fn set_fill_cmyk(&mut self, cmyk: Cmyk) -> usize {
        self.apply_fill(cmyk.to_rgb())
    }

    fn apply_fill(&mut self, color: Rgb) -> usize {
        self.session.fill_color = color;
        let paint = Paint::solid(color);

        let ids = self.engine.selection();
        let changed = ids.iter().filter(|id| self.engine.set_fill(**id, paint.clone())).count();
        if changed > 0 {
            log::debug!("editor: fill {} on {} objects", paint.describe(), changed);
            self.engine.request_render();
        }
        changed
    }

    // ── images ────────────────────────────────────────────────────────────

    /// Inserts every image load that has finished so far, without waiting.
    pub fn pump_images(&mut self) -> Vec<ObjectId> {
        let mut inserted = Vec::new();
        while let Some(loaded) = self.images.try_next() {
            inserted.extend(self.insert_loaded(loaded));
        }
        inserted
    }

    /// Waits for all pending image loads and inserts them.
    pub async fn settle_images(&mut self) -> Vec<ObjectId> {
        let mut inserted = Vec::new();
        while let Some(loaded) = self.images.next().await {
            inserted.extend(self.insert_loaded(loaded));
        }
        inserted
    }

    /// Discards in-flight image loads; they will never be inserted.
    pub fn cancel_image_loads(&mut self) {
        self.images.cancel();
    }

    fn insert_loaded(&mut self, loaded: LoadedImage) -> Option<ObjectId> {
        // Failures were logged by the loading task.
        let bitmap = loaded.result.ok()?;
        let id = self.engine.add_object(SceneObject::image(loaded.position, Arc::new(bitmap)));
        log::debug!("editor: image #{} inserted as {} at {:?}", loaded.index, id, loaded.position);
        self.engine.request_render();
        Some(id)
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Ends the session: drags are cancelled, image loads discarded and the
    /// pointer listener released. Returns the engine.
    pub fn detach(mut self) -> E {
        self.cancel_drags();
        self.images.cancel();
        if let Some(listener) = self.session.listener.take() {
            self.engine.remove_pointer_listener(listener);
        }
        log::debug!("editor: detached");
        self.engine
    }
}

impl<E: RenderEngine> EditorHandle for Editor<E> {
    fn set_fill_color(&mut self, hex: &str) -> Result<(), ColorError> {
        let color = Rgb::from_hex(hex)?;
        self.apply_fill(color);
        Ok(())
    }

    fn apply_gradient(&mut self, spec: &GradientSpec) -> usize {
        let ids = self.engine.selection();
        if ids.is_empty() {
            log::debug!("editor: {} gradient with empty selection", spec.kind);
            return 0;
        }
        self.session.gradient = Some(spec.clone());

        let mut changed = 0;
        for id in ids {
            let Some(bbox) = self.engine.object(id).map(|o| o.bounds.normalized().size) else {
                continue;
            };
            let paint = Paint::Gradient(compile(spec, bbox));
            let filled = spec.apply_to.fill() && self.engine.set_fill(id, paint.clone());
            let stroked = spec.apply_to.stroke() && self.engine.set_stroke(id, paint);
            if filled || stroked {
                changed += 1;
            }
        }

        if changed > 0 {
            log::debug!("editor: {} gradient applied to {} objects", spec.kind, changed);
            self.engine.request_render();
        }
        changed
    }

    fn insert_template(&mut self, id: &str) -> Result<Vec<ObjectId>, TemplateError> {
        let objects = self.templates.get(id)?.instantiate(Vec2::zero());
        let ids: Vec<ObjectId> = objects.into_iter().map(|o| self.engine.add_object(o)).collect();
        self.engine.set_selection(&ids);
        self.engine.request_render();
        log::info!("editor: inserted template '{}' ({} objects)", id, ids.len());
        Ok(ids)
    }

    fn add_images(&mut self, items: Vec<ImageSource>, position: Option<Vec2>) {
        if items.is_empty() {
            return;
        }
        let origin = position.unwrap_or(self.config.image_position);
        log::debug!("editor: loading {} images at {:?}", items.len(), origin);
        self.images.request(items, origin, self.config.image_cascade);
    }

    fn finalize_crop(&mut self) -> Option<CropOutcome> {
        let outcome = self.crop.finish(&mut self.engine, None, self.config.crop_scale);
        if outcome.is_none() {
            log::debug!("editor: finalize without an active crop");
        }
        outcome
    }

    fn apply_text_style(&mut self, style: &TextStyle) -> usize {
        self.session.text_style.merge(style);

        let mut changed = 0;
        for id in self.engine.selection() {
            if let Some(obj) = self.engine.object_mut(id) {
                if style.apply_to(obj) {
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            self.engine.request_render();
        }
        changed
    }

    fn apply_text_layout(&mut self, layout: TextLayout) -> usize {
        match layout {
            TextLayout::Point => self.session.text_mode = Some(TextMode::Point),
            TextLayout::Area => self.session.text_mode = Some(TextMode::Area),
            TextLayout::Path | TextLayout::Wrap => {}
        }

        let min_area = self.config.min_area_text;
        let mut changed = 0;
        for id in self.engine.selection() {
            let Some(obj) = self.engine.object_mut(id) else {
                continue;
            };
            let Some(block) = obj.text_mut() else {
                continue;
            };
            block.layout = layout;
            let estimated = block.estimated_size();

            let bounds = &mut obj.bounds;
            *bounds = bounds.normalized();
            match layout {
                TextLayout::Point => bounds.size = estimated,
                TextLayout::Area => {
                    bounds.size = Vec2::new(bounds.width().max(min_area.x), bounds.height().max(min_area.y))
                }
                TextLayout::Wrap => bounds.size.y = estimated.y,
                TextLayout::Path => {}
            }
            changed += 1;
        }

        if changed > 0 {
            self.engine.request_render();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    use easel_engine::coords::Rect;
    use easel_engine::paint::{ApplyTo, GradientGeometry, GradientKind};
    use easel_engine::scene::{ObjectKind, Scene};

    fn editor() -> (tokio::runtime::Runtime, Editor<Scene>) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let editor = Editor::new(Scene::new(400.0, 300.0), EditorConfig::default(), rt.handle().clone());
        (rt, editor)
    }

    fn add_rect(ed: &mut Editor<Scene>, r: Rect) -> ObjectId {
        ed.engine_mut().add_object(SceneObject::rect(r))
    }

    fn click(ed: &mut Editor<Scene>, from: Vec2, to: Vec2) -> EventResult {
        ed.handle_event(&InputEvent::pointer_down(from));
        ed.handle_event(&InputEvent::pointer_move(to));
        ed.handle_event(&InputEvent::pointer_up(to))
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(w, h, image::Rgba([0, 128, 255, 255]))
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn attach_and_detach_manage_the_listener() {
        let (_rt, ed) = editor();
        assert_eq!(ed.engine().listener_count(), 1);
        assert!(ed.session().listener.is_some());

        let scene = ed.detach();
        assert_eq!(scene.listener_count(), 0);
    }

    #[test]
    fn detach_removes_crop_overlay() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Crop);
        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        assert_eq!(ed.engine().len(), 1);
        assert!(ed.detach().is_empty());
    }

    // ── fills ─────────────────────────────────────────────────────────────

    #[test]
    fn set_fill_color_fills_selection() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = add_rect(&mut ed, Rect::new(20.0, 0.0, 10.0, 10.0));
        ed.engine_mut().set_selection(&[a]);

        ed.set_fill_color("#ff8800").unwrap();
        assert_eq!(ed.engine().object(a).unwrap().fill, Some(Paint::solid(Rgb::new(255, 136, 0))));
        assert_eq!(ed.engine().object(b).unwrap().fill, None);
        assert_eq!(ed.session().fill_color, Rgb::new(255, 136, 0));
    }

    #[test]
    fn set_fill_color_with_empty_selection_only_stores_color() {
        let (_rt, mut ed) = editor();
        let before = ed.engine().render_requests();
        ed.set_fill_color("0f0").unwrap();
        assert_eq!(ed.session().fill_color, Rgb::new(0, 255, 0));
        assert_eq!(ed.engine().render_requests(), before);
    }

    #[test]
    fn malformed_fill_color_is_rejected() {
        let (_rt, mut ed) = editor();
        let before = ed.session().fill_color;
        assert!(ed.set_fill_color("#12345").is_err());
        assert_eq!(ed.session().fill_color, before);
    }

    #[test]
    fn set_fill_cmyk_converts_to_rgb() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        ed.engine_mut().set_selection(&[a]);
        assert_eq!(ed.set_fill_cmyk(Cmyk::new(0, 100, 100, 0)), 1);
        assert_eq!(ed.engine().object(a).unwrap().fill, Some(Paint::solid(Rgb::new(255, 0, 0))));
    }

    // ── gradients ─────────────────────────────────────────────────────────

    #[test]
    fn gradient_is_compiled_per_target_bounds() {
        let (_rt, mut ed) = editor();
        let small = add_rect(&mut ed, Rect::new(0.0, 0.0, 100.0, 50.0));
        let wide = add_rect(&mut ed, Rect::new(0.0, 100.0, 300.0, 50.0));
        ed.engine_mut().set_selection(&[small, wide]);

        let spec = GradientSpec::new(GradientKind::Linear, Rgb::new(255, 0, 0), Rgb::new(0, 0, 255));
        assert_eq!(ed.apply_gradient(&spec), 2);

        let end_x = |id| match &ed.engine().object(id).unwrap().fill {
            Some(Paint::Gradient(g)) => match g.geometry {
                GradientGeometry::Linear { end, .. } => end.x,
                _ => panic!("expected linear geometry"),
            },
            other => panic!("expected gradient, got {other:?}"),
        };
        assert_eq!(end_x(small), 100.0);
        assert_eq!(end_x(wide), 300.0);
        assert_eq!(ed.session().gradient.as_ref(), Some(&spec));
    }

    #[test]
    fn gradient_can_target_stroke_only() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        ed.engine_mut().set_selection(&[a]);

        let spec = GradientSpec::new(GradientKind::Radial, Rgb::BLACK, Rgb::WHITE).apply_to(ApplyTo::Stroke);
        ed.apply_gradient(&spec);
        let obj = ed.engine().object(a).unwrap();
        assert_eq!(obj.fill, None);
        assert!(matches!(obj.stroke.as_ref().map(|s| &s.paint), Some(Paint::Gradient(_))));
    }

    #[test]
    fn gradient_on_both_channels_counts_each_object_once() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = add_rect(&mut ed, Rect::new(20.0, 0.0, 10.0, 10.0));
        ed.engine_mut().set_selection(&[a, b]);

        let spec = GradientSpec::new(GradientKind::Linear, Rgb::BLACK, Rgb::WHITE).apply_to(ApplyTo::Both);
        assert_eq!(ed.apply_gradient(&spec), 2);
        for id in [a, b] {
            let obj = ed.engine().object(id).unwrap();
            assert!(matches!(obj.fill, Some(Paint::Gradient(_))));
            assert!(matches!(obj.stroke.as_ref().map(|s| &s.paint), Some(Paint::Gradient(_))));
        }
    }

    #[test]
    fn gradient_with_empty_selection_is_noop() {
        let (_rt, mut ed) = editor();
        add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let before = ed.engine().render_requests();
        assert_eq!(ed.apply_gradient(&GradientSpec::default()), 0);
        assert_eq!(ed.engine().render_requests(), before);
        assert!(ed.session().gradient.is_none());
    }

    // ── crop ──────────────────────────────────────────────────────────────

    #[test]
    fn crop_drag_replaces_scene() {
        let (_rt, mut ed) = editor();
        ed.engine_mut().add_object(SceneObject::rect(Rect::new(60.0, 60.0, 20.0, 20.0)).fill(Paint::solid(Rgb::BLACK)));
        ed.set_tool(Tool::Crop);

        assert_eq!(click(&mut ed, Vec2::new(150.0, 120.0), Vec2::new(50.0, 50.0)), EventResult::Consumed);

        let ids = ed.engine().object_ids();
        assert_eq!(ids.len(), 1);
        let obj = ed.engine().object(ids[0]).unwrap();
        assert!(matches!(obj.kind, ObjectKind::Image(_)));
        assert_eq!(obj.bounds, Rect::new(50.0, 50.0, 100.0, 70.0));
        assert_eq!(ed.engine().selection(), ids);
    }

    #[test]
    fn enter_finalizes_crop_at_last_position() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Crop);
        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        ed.handle_event(&InputEvent::pointer_move(Vec2::new(60.0, 30.0)));

        assert_eq!(ed.handle_event(&InputEvent::key_press(Key::Enter)), EventResult::Consumed);
        assert!(!ed.crop_tool().is_dragging());
        assert_eq!(ed.engine().len(), 1);
        assert_eq!(ed.finalize_crop(), None);
    }

    #[test]
    fn crop_scale_too_large_cancels_the_crop() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let config = EditorConfig { crop_scale: 1.0e5, ..EditorConfig::default() };
        let mut ed = Editor::new(Scene::new(400.0, 300.0), config, rt.handle().clone());
        let block = add_rect(&mut ed, Rect::new(60.0, 60.0, 20.0, 20.0));
        ed.set_tool(Tool::Crop);
        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        ed.handle_event(&InputEvent::pointer_move(Vec2::new(200.0, 200.0)));

        assert_eq!(ed.finalize_crop(), Some(CropOutcome::Cancelled));
        assert_eq!(ed.engine().object_ids(), vec![block]);
    }

    #[test]
    fn escape_cancels_crop() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Crop);
        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        assert_eq!(ed.handle_event(&InputEvent::key_press(Key::Escape)), EventResult::Consumed);
        assert!(ed.engine().is_empty());
        assert_eq!(ed.handle_event(&InputEvent::key_press(Key::Escape)), EventResult::Ignored);
    }

    #[test]
    fn switching_tools_cancels_crop_drag() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Crop);
        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        ed.set_tool(Tool::Select);
        assert!(ed.engine().is_empty());
        assert!(!ed.crop_tool().is_dragging());
    }

    #[test]
    fn unmatched_pointer_buttons_are_ignored() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Text);

        // Release whose press landed outside the surface.
        assert_eq!(ed.handle_event(&InputEvent::pointer_up(Vec2::new(10.0, 10.0))), EventResult::Ignored);
        assert!(ed.engine().is_empty());

        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        assert_eq!(ed.handle_event(&InputEvent::pointer_down(Vec2::new(90.0, 90.0))), EventResult::Ignored);
        assert_eq!(ed.handle_event(&InputEvent::pointer_up(Vec2::new(11.0, 10.0))), EventResult::Consumed);
        assert_eq!(ed.input().pointer_pos, Some(Vec2::new(11.0, 10.0)));
        assert!(!ed.input().button_down(MouseButton::Left));

        let id = ed.engine().object_ids()[0];
        assert_eq!(ed.engine().object(id).unwrap().bounds.origin, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn focus_loss_forgets_held_button() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Crop);
        ed.handle_event(&InputEvent::pointer_down(Vec2::new(10.0, 10.0)));
        ed.handle_event(&InputEvent::Focused(false));
        assert!(!ed.crop_tool().is_dragging());

        assert_eq!(ed.handle_event(&InputEvent::pointer_up(Vec2::new(50.0, 50.0))), EventResult::Ignored);
        assert_eq!(ed.handle_event(&InputEvent::pointer_down(Vec2::new(20.0, 20.0))), EventResult::Consumed);
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn click_places_point_text_and_drag_places_area_text() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Text);

        click(&mut ed, Vec2::new(10.0, 10.0), Vec2::new(12.0, 11.0));
        click(&mut ed, Vec2::new(200.0, 200.0), Vec2::new(210.0, 200.0));

        let ids = ed.engine().object_ids();
        let point = ed.engine().object(ids[0]).unwrap();
        assert_eq!(point.text().map(|t| t.layout), Some(TextLayout::Point));
        assert_eq!(point.text().map(|t| t.content.as_str()), Some("Your text here"));
        let area = ed.engine().object(ids[1]).unwrap();
        assert_eq!(area.bounds, Rect::new(200.0, 200.0, 40.0, 24.0));
        assert_eq!(ed.engine().selection(), vec![ids[1]]);
    }

    #[test]
    fn forced_area_mode_applies_to_clicks() {
        let (_rt, mut ed) = editor();
        ed.set_tool(Tool::Text);
        ed.apply_text_layout(TextLayout::Area);
        click(&mut ed, Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0));

        let id = ed.engine().object_ids()[0];
        assert_eq!(ed.engine().object(id).unwrap().text().map(|t| t.layout), Some(TextLayout::Area));
    }

    #[test]
    fn session_text_style_carries_to_new_text() {
        let (_rt, mut ed) = editor();
        ed.apply_text_style(&TextStyle { font_size: Some(64.0), color: Some(Rgb::WHITE), ..TextStyle::default() });
        ed.set_tool(Tool::Text);
        click(&mut ed, Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0));

        let obj = ed.engine().object(ed.engine().object_ids()[0]).unwrap();
        assert_eq!(obj.text().map(|t| t.font_size), Some(64.0));
        assert_eq!(obj.fill, Some(Paint::solid(Rgb::WHITE)));
    }

    #[test]
    fn text_style_skips_non_text_selection() {
        let (_rt, mut ed) = editor();
        let r = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let t = ed.engine_mut().add_object(SceneObject::point_text(Vec2::new(50.0, 50.0), TextBlock::new("x")));
        ed.engine_mut().set_selection(&[r, t]);

        let changed = ed.apply_text_style(&TextStyle { underline: Some(true), ..TextStyle::default() });
        assert_eq!(changed, 1);
        assert_eq!(ed.engine().object(t).unwrap().text().map(|b| b.underline), Some(true));
    }

    #[test]
    fn text_layout_reshapes_selected_text() {
        let (_rt, mut ed) = editor();
        let t = ed.engine_mut().add_object(SceneObject::point_text(Vec2::new(5.0, 5.0), TextBlock::new("ab")));
        ed.engine_mut().set_selection(&[t]);

        assert_eq!(ed.apply_text_layout(TextLayout::Area), 1);
        let area = ed.engine().object(t).unwrap();
        assert_eq!(area.text().map(|b| b.layout), Some(TextLayout::Area));
        assert!(area.bounds.width() >= 40.0 && area.bounds.height() >= 24.0);

        ed.apply_text_layout(TextLayout::Path);
        assert_eq!(ed.session().text_mode, Some(TextMode::Area));
        assert_eq!(ed.engine().object(t).unwrap().text().map(|b| b.layout), Some(TextLayout::Path));

        ed.apply_text_layout(TextLayout::Point);
        let point = ed.engine().object(t).unwrap();
        assert_eq!(point.bounds.size, TextBlock::new("ab").estimated_size());
        assert_eq!(point.bounds.origin, Vec2::new(5.0, 5.0));
    }

    // ── selection ─────────────────────────────────────────────────────────

    #[test]
    fn select_tool_clicks_select_and_shift_extends() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = add_rect(&mut ed, Rect::new(20.0, 0.0, 10.0, 10.0));

        assert_eq!(click(&mut ed, Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)), EventResult::Ignored);
        assert_eq!(ed.engine().selection(), vec![a]);

        let shift = Modifiers { shift: true, ..Modifiers::default() };
        ed.handle_event(&InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            pos: Vec2::new(25.0, 5.0),
            modifiers: shift,
        }));
        ed.handle_event(&InputEvent::pointer_up(Vec2::new(25.0, 5.0)));
        assert_eq!(ed.engine().selection(), vec![a, b]);

        click(&mut ed, Vec2::new(200.0, 200.0), Vec2::new(200.0, 200.0));
        assert!(ed.engine().selection().is_empty());
    }

    #[test]
    fn delete_key_removes_selection() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        add_rect(&mut ed, Rect::new(20.0, 0.0, 10.0, 10.0));
        ed.engine_mut().set_selection(&[a]);

        assert_eq!(ed.handle_event(&InputEvent::key_press(Key::Delete)), EventResult::Consumed);
        assert_eq!(ed.engine().len(), 1);
        assert_eq!(ed.handle_event(&InputEvent::key_press(Key::Backspace)), EventResult::Ignored);
    }

    #[test]
    fn arrange_keeps_relative_order_of_selection() {
        let (_rt, mut ed) = editor();
        let a = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        let c = add_rect(&mut ed, Rect::new(0.0, 0.0, 10.0, 10.0));
        ed.engine_mut().set_selection(&[a, b]);

        ed.arrange(Arrange::ToFront);
        assert_eq!(ed.engine().object_ids(), vec![c, a, b]);

        ed.arrange(Arrange::ToBack);
        assert_eq!(ed.engine().object_ids(), vec![a, b, c]);

        ed.arrange(Arrange::Forward);
        assert_eq!(ed.engine().object_ids(), vec![c, a, b]);
    }

    // ── templates ─────────────────────────────────────────────────────────

    #[test]
    fn insert_template_selects_its_objects() {
        let (_rt, mut ed) = editor();
        let ids = ed.insert_template("title-card").unwrap();
        assert!(!ids.is_empty());
        assert_eq!(ed.engine().selection(), ids);
        assert_eq!(ed.insert_template("missing"), Err(TemplateError::Unknown("missing".into())));
    }

    // ── images ────────────────────────────────────────────────────────────

    fn async_editor() -> Editor<Scene> {
        Editor::new(Scene::new(400.0, 300.0), EditorConfig::default(), Handle::current())
    }

    #[tokio::test]
    async fn images_cascade_from_position() {
        let mut ed = async_editor();
        ed.add_images(
            vec![ImageSource::bytes("a.png", png(4, 4)), ImageSource::bytes("b.png", png(4, 4))],
            Some(Vec2::new(100.0, 100.0)),
        );
        let ids = ed.settle_images().await;
        assert_eq!(ids.len(), 2);

        let mut origins: Vec<Vec2> = ids.iter().map(|id| ed.engine().object(*id).unwrap().bounds.origin).collect();
        origins.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(origins, vec![Vec2::new(100.0, 100.0), Vec2::new(124.0, 124.0)]);
    }

    #[tokio::test]
    async fn failed_image_does_not_block_batch() {
        let mut ed = async_editor();
        ed.add_images(
            vec![
                ImageSource::File(PathBuf::from("/no/such/image.png")),
                ImageSource::bytes("ok.png", png(2, 3)),
            ],
            None,
        );
        let ids = ed.settle_images().await;
        assert_eq!(ids.len(), 1);
        let obj = ed.engine().object(ids[0]).unwrap();
        assert_eq!(obj.bounds, Rect::new(64.0, 64.0, 2.0, 3.0));
        assert_eq!(ed.pending_images(), 0);
    }

    #[tokio::test]
    async fn dropping_the_editor_releases_pending_image_urls() {
        let mut ed = async_editor();
        ed.add_images(vec![ImageSource::bytes("a.png", png(2, 2)), ImageSource::bytes("b.png", png(2, 2))], None);
        let store = ed.images.blobs().clone();
        assert_eq!(store.live_count(), 2);

        drop(ed);
        for _ in 0..100 {
            if store.live_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn tool_switch_discards_pending_images() {
        let mut ed = async_editor();
        ed.add_images(vec![ImageSource::bytes("late.png", png(2, 2))], None);
        ed.set_tool(Tool::Crop);

        assert!(ed.settle_images().await.is_empty());
        tokio::task::yield_now().await;
        assert!(ed.pump_images().is_empty());
        assert!(ed.engine().is_empty());
    }
}
