use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    blobs: HashMap<String, Arc<[u8]>>,
    next: u64,
}

/// Registry of in-memory payloads addressable by temporary `blob:` URLs.
///
/// Cloning shares the registry. URLs are handed out as [`TempUrl`] guards and
/// revoked when the guard drops.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<Inner>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No critical section can leave the map half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `data` and returns the guard owning its URL.
    pub fn register(&self, name: &str, data: Arc<[u8]>) -> TempUrl {
        let mut inner = self.lock();
        inner.next += 1;
        let url = format!("blob:easel/{}/{}", inner.next, name);
        inner.blobs.insert(url.clone(), data);
        log::trace!("blob: registered {url}");
        TempUrl { url, store: self.clone() }
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.lock().blobs.get(url).cloned()
    }

    /// Number of URLs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }

    fn revoke(&self, url: &str) {
        if self.lock().blobs.remove(url).is_some() {
            log::trace!("blob: revoked {url}");
        }
    }
}

/// Temporary URL for a registered blob. Revoked on drop.
pub struct TempUrl {
    url: String,
    store: BlobStore,
}

impl TempUrl {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn resolve(&self) -> Option<Arc<[u8]>> {
        self.store.resolve(&self.url)
    }
}

impl fmt::Debug for TempUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TempUrl").field(&self.url).finish()
    }
}

impl Drop for TempUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}
