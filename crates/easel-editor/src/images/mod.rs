//! Asynchronous image loading.
//!
//! Each requested item runs as its own tokio task: read (file via `tokio::fs`,
//! in-memory bytes via a temporary blob URL), decode on the blocking pool,
//! then send the result over a channel. The scene is never touched from a
//! task; the owning editor drains the channel and inserts objects itself.
//!
//! Every request is stamped with the loader's generation. [`ImageLoader::cancel`]
//! bumps the generation, so results that arrive afterwards are discarded.

pub mod blob;

pub use blob::{BlobStore, TempUrl};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use easel_engine::coords::Vec2;

/// Something the loader can turn into a bitmap.
#[derive(Debug, Clone)]
pub enum ImageSource {
    File(PathBuf),
    /// Bytes already in memory, e.g. from a drop or paste.
    Bytes { name: String, data: Arc<[u8]> },
}

impl ImageSource {
    pub fn bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        ImageSource::Bytes { name: name.into(), data: data.into() }
    }

    pub fn name(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }
}

/// A single image that could not be read or decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLoadError {
    pub source_name: String,
    pub reason: String,
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load image '{}': {}", self.source_name, self.reason)
    }
}

impl std::error::Error for ImageLoadError {}

/// Completion message of one load.
#[derive(Debug)]
pub struct LoadedImage {
    pub generation: u64,
    /// Position of the item in its batch.
    pub index: usize,
    /// Placement computed when the batch was requested.
    pub position: Vec2,
    pub result: Result<RgbaImage, ImageLoadError>,
}

pub struct ImageLoader {
    runtime: Handle,
    blobs: BlobStore,
    tx: UnboundedSender<LoadedImage>,
    rx: UnboundedReceiver<LoadedImage>,
    generation: u64,
    in_flight: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl ImageLoader {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            blobs: BlobStore::new(),
            tx,
            rx,
            generation: 0,
            in_flight: 0,
            tasks: Vec::new(),
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Loads of the current generation not yet drained.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Starts one task per item. Item `i` is placed at `origin + cascade * i`.
    pub fn request(&mut self, items: Vec<ImageSource>, origin: Vec2, cascade: Vec2) {
        self.tasks.retain(|t| !t.is_finished());

        for (index, source) in items.into_iter().enumerate() {
            let position = origin + cascade * index as f32;
            let generation = self.generation;
            let tx = self.tx.clone();

            // Registered here so the URL exists before the task runs; the task owns the guard.
            let blob = match &source {
                ImageSource::Bytes { name, data } => Some(self.blobs.register(name, data.clone())),
                ImageSource::File(_) => None,
            };

            let task = self.runtime.spawn(async move {
                let result = load(&source, blob).await;
                if let Err(e) = &result {
                    log::warn!("images: {e}");
                }
                let _ = tx.send(LoadedImage { generation, index, position, result });
            });
            self.tasks.push(task);
            self.in_flight += 1;
        }
    }

    /// Discards every pending load. Their temporary URLs are released as the
    /// aborted tasks drop.
    pub fn cancel(&mut self) {
        if self.in_flight > 0 {
            log::debug!("images: discarding {} pending loads", self.in_flight);
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.generation += 1;
        self.in_flight = 0;
    }

    fn accept(&mut self, loaded: LoadedImage) -> Option<LoadedImage> {
        if loaded.generation != self.generation {
            log::debug!(
                "images: dropping stale load #{} (generation {})",
                loaded.index,
                loaded.generation
            );
            return None;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(loaded)
    }

    /// Next finished load of the current generation, without waiting.
    pub fn try_next(&mut self) -> Option<LoadedImage> {
        while let Ok(loaded) = self.rx.try_recv() {
            if let Some(loaded) = self.accept(loaded) {
                return Some(loaded);
            }
        }
        None
    }

    /// Waits for the next load of the current generation. `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<LoadedImage> {
        while self.in_flight > 0 {
            let loaded = self.rx.recv().await?;
            if let Some(loaded) = self.accept(loaded) {
                return Some(loaded);
            }
        }
        None
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoader")
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

async fn load(source: &ImageSource, blob: Option<TempUrl>) -> Result<RgbaImage, ImageLoadError> {
    let fail = |reason: String| ImageLoadError { source_name: source.name(), reason };

    let bytes: Arc<[u8]> = match (source, &blob) {
        (ImageSource::File(path), _) => {
            tokio::fs::read(path).await.map_err(|e| fail(e.to_string()))?.into()
        }
        (ImageSource::Bytes { .. }, Some(url)) => {
            url.resolve().ok_or_else(|| fail(format!("{} was revoked", url.as_str())))?
        }
        (ImageSource::Bytes { data, .. }, None) => data.clone(),
    };

    let decode = move || image::load_from_memory(&bytes).map(|img| img.to_rgba8());
    let decoded = tokio::task::spawn_blocking(decode)
        .await
        .map_err(|e| fail(e.to_string()))?
        .map_err(|e| fail(e.to_string()));

    // The URL is released on every path once the payload is no longer needed.
    drop(blob);
    decoded
}
