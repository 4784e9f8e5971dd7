use std::collections::HashSet;

use image::RgbaImage;

use crate::coords::{Rect, Vec2};
use crate::paint::Rgb;
use crate::raster::{self, RasterError};
use crate::surface::{ListenerId, RenderEngine};

use super::{Layer, ObjectId, PaintKey, SceneObject};

/// Layer move applied by [`RenderEngine::arrange`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Arrange {
    ToFront,
    ToBack,
    /// One step up in paint order.
    Forward,
    /// One step down in paint order.
    Backward,
}

#[derive(Debug, Clone)]
struct Entry {
    id: ObjectId,
    key: PaintKey,
    object: SceneObject,
}

/// In-memory design surface.
///
/// Objects are kept sorted in paint order (back-to-front) at all times:
/// - `add_object()` appends on top of the highest layer, O(1)
/// - `arrange()` rewrites one key and re-sorts (stable)
///
/// Rendering is a CPU rasterizer, see [`crate::raster`].
#[derive(Debug)]
pub struct Scene {
    size: Vec2,
    background: Option<Rgb>,
    entries: Vec<Entry>,
    selection: Vec<ObjectId>,
    next_id: u64,
    next_seq: u32,
    listeners: HashSet<ListenerId>,
    next_listener: u64,
    render_requests: u64,
}

impl Scene {
    /// Creates an empty surface of `width` × `height` logical pixels with a white background.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            background: Some(Rgb::WHITE),
            entries: Vec::new(),
            selection: Vec::new(),
            next_id: 1,
            next_seq: 0,
            listeners: HashSet::new(),
            next_listener: 1,
            render_requests: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Vec2::zero(), self.size)
    }

    #[inline]
    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Objects in paint order (back-to-front).
    pub fn iter_in_paint_order(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.entries.iter().map(|e| (e.id, &e.object))
    }

    /// Number of render requests received so far.
    #[inline]
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// Number of currently registered pointer listeners.
    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn top_layer(&self) -> Layer {
        self.entries.last().map_or(Layer::default(), |e| e.key.layer)
    }

    fn bottom_layer(&self) -> Layer {
        self.entries.first().map_or(Layer::default(), |e| e.key.layer)
    }

    fn next_key(&mut self, layer: Layer) -> PaintKey {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        PaintKey { layer, seq }
    }

    fn resort(&mut self) {
        self.entries.sort_by(|a, b| a.key.cmp(&b.key));
        let order: Vec<ObjectId> = self.entries.iter().map(|e| e.id).collect();
        self.selection.sort_by_key(|id| order.iter().position(|o| o == id));
    }
}

impl RenderEngine for Scene {
    fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let key = self.next_key(self.top_layer());
        log::trace!("scene: add {} {} at {:?}", object.kind.name(), id, object.bounds);
        self.entries.push(Entry { id, key, object });
        id
    }

    fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.index_of(id)?;
        self.selection.retain(|s| *s != id);
        Some(self.entries.remove(idx).object)
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.object)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.entries.iter_mut().find(|e| e.id == id).map(|e| &mut e.object)
    }

    fn object_ids(&self) -> Vec<ObjectId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    fn selection(&self) -> Vec<ObjectId> {
        self.selection.clone()
    }

    fn set_selection(&mut self, ids: &[ObjectId]) {
        self.selection = self
            .entries
            .iter()
            .filter(|e| e.object.selectable && ids.contains(&e.id))
            .map(|e| e.id)
            .collect();
    }

    fn hit_test(&self, p: Vec2) -> Option<ObjectId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.object.evented && e.object.contains(p))
            .map(|e| e.id)
    }

    fn rasterize(&self, region: Rect, scale: f32) -> Result<RgbaImage, RasterError> {
        let objects = self.iter_in_paint_order().map(|(_, object)| object);
        raster::rasterize(self.background, objects, region, scale)
    }

    fn arrange(&mut self, id: ObjectId, arrange: Arrange) {
        let Some(idx) = self.index_of(id) else {
            return;
        };

        match arrange {
            Arrange::ToFront => {
                let key = self.next_key(self.top_layer().above());
                self.entries[idx].key = key;
            }
            Arrange::ToBack => {
                let key = self.next_key(self.bottom_layer().below());
                self.entries[idx].key = key;
            }
            Arrange::Forward if idx + 1 < self.entries.len() => {
                let above = self.entries[idx + 1].key;
                self.entries[idx + 1].key = self.entries[idx].key;
                self.entries[idx].key = above;
            }
            Arrange::Backward if idx > 0 => {
                let below = self.entries[idx - 1].key;
                self.entries[idx - 1].key = self.entries[idx].key;
                self.entries[idx].key = below;
            }
            Arrange::Forward | Arrange::Backward => return,
        }

        self.resort();
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
        log::trace!("scene: render requested ({} objects)", self.entries.len());
    }

    fn add_pointer_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        id
    }

    fn remove_pointer_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}
