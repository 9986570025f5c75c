//! Decoded image cache (RAM)

use feed_api::ImageId;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Decoded image held in RAM
#[derive(Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels
    pub data: Vec<u8>,
    /// xxh3 of the encoded bytes
    pub hash: u64,
}

/// Holds warmed images until the view picks them up.
///
/// Bounded both by entry count and by decoded bytes. Eviction is
/// oldest-inserted first, the same order in which the feed window drops
/// items. The newest entry is always kept, even when it alone exceeds the
/// byte budget.
pub struct DecodedCache {
    inner: RwLock<CacheInner>,
    capacity: usize,
    max_bytes: usize,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<ImageId, Arc<DecodedImage>>,
    order: VecDeque<ImageId>,
    bytes: usize,
}

impl DecodedCache {
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            capacity: capacity.max(1),
            max_bytes,
        }
    }

    pub fn get(&self, id: &ImageId) -> Option<Arc<DecodedImage>> {
        self.inner.read().entries.get(id).cloned()
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.inner.read().entries.contains_key(id)
    }

    /// Store a decoded image, evicting the oldest entries over either bound
    pub fn insert(&self, id: ImageId, image: DecodedImage) -> Arc<DecodedImage> {
        let image = Arc::new(image);
        let mut inner = self.inner.write();

        if let Some(old) = inner.entries.insert(id.clone(), image.clone()) {
            inner.bytes = inner.bytes.saturating_sub(old.data.len());
            inner.order.retain(|k| k != &id);
        }
        inner.bytes += image.data.len();
        inner.order.push_back(id);

        while inner.order.len() > 1
            && (inner.order.len() > self.capacity || inner.bytes > self.max_bytes)
        {
            let Some(evicted) = inner.order.pop_front() else {
                break;
            };
            if let Some(old) = inner.entries.remove(&evicted) {
                inner.bytes = inner.bytes.saturating_sub(old.data.len());
                tracing::trace!("Evicted decoded {} ({} bytes)", evicted, old.data.len());
            }
        }

        image
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.order.clear();
        inner.bytes = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        CacheStats {
            entries: inner.entries.len(),
            bytes: inner.bytes,
            capacity: self.capacity,
            max_bytes: self.max_bytes,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: usize,
    pub capacity: usize,
    pub max_bytes: usize,
}
