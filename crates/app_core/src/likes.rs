//! Liked-image tracking and persistence
//!
//! All liked ids live under one durable key as a JSON object mapping
//! event id to a list of image ids. Likes are a weak, id-keyed relation:
//! an id stays liked even if the image is never fetched again.

use crate::AppError;
use app_db::DurableStore;
use feed_api::{EventId, ImageId};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Durable key holding every event's liked ids
pub const LIKES_KEY: &str = "likedImagesByEvent";

type LikesDocument = BTreeMap<EventId, Vec<ImageId>>;

/// Per-event liked ids on top of a `DurableStore`
#[derive(Clone)]
pub struct PersistentLikeStore {
    store: Arc<dyn DurableStore>,
}

impl PersistentLikeStore {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    fn read_document(&self) -> Result<LikesDocument, AppError> {
        let Some(raw) = self.store.get(LIKES_KEY)? else {
            return Ok(LikesDocument::new());
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", LIKES_KEY, e);
                Ok(LikesDocument::new())
            }
        }
    }

    /// Liked ids of `event` (empty when nothing is stored)
    pub fn load(&self, event: &EventId) -> Result<HashSet<ImageId>, AppError> {
        let mut doc = self.read_document()?;
        Ok(doc.remove(event).unwrap_or_default().into_iter().collect())
    }

    /// Replace the liked ids of `event`, keeping other events intact
    pub fn save(&self, event: &EventId, ids: &HashSet<ImageId>) -> Result<(), AppError> {
        let mut doc = self.read_document()?;
        let mut sorted: Vec<ImageId> = ids.iter().cloned().collect();
        sorted.sort();
        doc.insert(event.clone(), sorted);

        let raw = serde_json::to_string(&doc)?;
        self.store.put(LIKES_KEY, &raw)?;
        tracing::debug!("Persisted {} liked ids for {}", ids.len(), event);
        Ok(())
    }
}

/// In-memory liked set of the active event.
///
/// Hydrates from the store once, then mirrors every change back. The
/// first change notification of a session is the hydration itself and is
/// never written, so stored likes cannot be clobbered by the empty set
/// the tracker starts with.
pub struct LikeTracker {
    event: EventId,
    liked: HashSet<ImageId>,
    store: PersistentLikeStore,
    hydrated: bool,
    skip_next_persist: bool,
}

impl LikeTracker {
    pub fn open(event: EventId, store: PersistentLikeStore) -> Self {
        Self {
            event,
            liked: HashSet::new(),
            store,
            hydrated: false,
            skip_next_persist: true,
        }
    }

    pub fn event(&self) -> &EventId {
        &self.event
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Load stored likes; later calls are no-ops
    pub fn hydrate(&mut self) -> Result<(), AppError> {
        if self.hydrated {
            return Ok(());
        }
        self.liked = self.store.load(&self.event)?;
        self.hydrated = true;
        tracing::info!("Hydrated {} liked images for {}", self.liked.len(), self.event);
        self.changed()
    }

    /// Flip membership of `id` and persist; returns the new membership.
    ///
    /// On a storage error the in-memory change is kept.
    pub fn toggle(&mut self, id: ImageId) -> Result<bool, AppError> {
        self.hydrate()?;
        let liked = if self.liked.remove(&id) {
            false
        } else {
            self.liked.insert(id);
            true
        };
        self.changed()?;
        Ok(liked)
    }

    fn changed(&mut self) -> Result<(), AppError> {
        if std::mem::take(&mut self.skip_next_persist) {
            return Ok(());
        }
        self.store.save(&self.event, &self.liked)
    }

    pub fn is_liked(&self, id: &ImageId) -> bool {
        self.liked.contains(id)
    }

    pub fn ids(&self) -> &HashSet<ImageId> {
        &self.liked
    }

    /// Liked ids in a stable order
    pub fn sorted_ids(&self) -> Vec<ImageId> {
        let mut ids: Vec<ImageId> = self.liked.iter().cloned().collect();
        ids.sort();
        ids
    }
}
