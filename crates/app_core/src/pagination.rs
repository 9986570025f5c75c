//! Incremental page loading for one event feed
//!
//! `PaginationController` owns the feed items, the page cursor and the
//! render window. At most one page fetch is in flight at any time: the
//! `Fetching` phase is the fetch lock, held by a scoped `FetchLock` that
//! releases it on every exit path (success, error or a dropped future).
//!
//! Every request captures the feed generation. `reset` bumps it, so a
//! response that arrives after the event changed is discarded.

use crate::preloader::Preloader;
use crate::window::Window;
use crate::AppError;
use feed_api::{EventId, ImageFeedApi, ImageId, ImageItem};
use parking_lot::Mutex;
use std::sync::Arc;

/// Pagination state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    /// A page request is outstanding
    Fetching,
    /// The server has no more pages; terminal until reset
    Exhausted,
}

/// Items fetched so far for the active event
#[derive(Debug, Clone)]
pub struct FeedState {
    items: Vec<ImageItem>,
    page: u32,
    page_size: u32,
    phase: FeedPhase,
}

impl FeedState {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            phase: FeedPhase::Idle,
        }
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    /// Next page to request
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == FeedPhase::Exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == FeedPhase::Fetching
    }
}

/// Result of `request_next_page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// A page was merged
    Appended { count: usize, evicted: usize, exhausted: bool },
    /// Nothing was requested
    Skipped(SkipReason),
    /// The response belonged to a previous event and was dropped
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    Exhausted,
    NoEvent,
    LikedOnly,
}

struct Inner {
    event: Option<EventId>,
    generation: u64,
    state: FeedState,
    window: Window,
}

/// Scoped ownership of the `Fetching` phase
struct FetchLock<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
}

impl Drop for FetchLock<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.generation == self.generation && inner.state.phase == FeedPhase::Fetching {
            inner.state.phase = FeedPhase::Idle;
        }
    }
}

pub struct PaginationController {
    api: Arc<dyn ImageFeedApi>,
    preloader: Preloader,
    inner: Mutex<Inner>,
}

impl PaginationController {
    pub fn new(api: Arc<dyn ImageFeedApi>, preloader: Preloader, page_size: u32, window_capacity: usize) -> Self {
        Self {
            api,
            preloader,
            inner: Mutex::new(Inner {
                event: None,
                generation: 0,
                state: FeedState::new(page_size),
                window: Window::new(window_capacity),
            }),
        }
    }

    /// Start over for `event`, invalidating any in-flight request
    pub fn reset(&self, event: Option<EventId>, page_size: u32, window_capacity: usize) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.event = event;
        inner.state = FeedState::new(page_size);
        inner.window = Window::new(window_capacity);
        tracing::debug!(generation = inner.generation, "Feed reset");
        inner.generation
    }

    /// Fetch and merge the next page.
    ///
    /// Returns immediately with `Skipped` while a fetch is in flight or once
    /// the feed is exhausted. A failed fetch leaves the feed untouched so a
    /// later call retries the same page.
    pub async fn request_next_page(&self) -> Result<PageOutcome, AppError> {
        let (event, page, page_size, lock) = {
            let mut inner = self.inner.lock();
            let Some(event) = inner.event.clone() else {
                return Ok(PageOutcome::Skipped(SkipReason::NoEvent));
            };
            match inner.state.phase {
                FeedPhase::Fetching => {
                    tracing::debug!("Page request skipped: fetch in flight");
                    return Ok(PageOutcome::Skipped(SkipReason::InFlight));
                }
                FeedPhase::Exhausted => return Ok(PageOutcome::Skipped(SkipReason::Exhausted)),
                FeedPhase::Idle => {}
            }
            inner.state.phase = FeedPhase::Fetching;
            let lock = FetchLock {
                inner: &self.inner,
                generation: inner.generation,
            };
            (event, inner.state.page, inner.state.page_size, lock)
        };

        tracing::debug!("Requesting page {} (size {}) of {}", page, page_size, event);
        let fetched = self.api.fetch_page(&event, page, page_size).await;

        if !self.is_current(lock.generation) {
            tracing::warn!("Dropping stale page {} of {}", page, event);
            return Ok(PageOutcome::Stale);
        }
        let fetched = match fetched {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Fetching page {} of {} failed: {}", page, event, e);
                return Err(e.into());
            }
        };

        if !fetched.items.is_empty() {
            self.preloader.warm(&fetched.items).await;
        }

        let mut inner = self.inner.lock();
        if inner.generation != lock.generation {
            tracing::warn!("Dropping stale page {} of {}", page, event);
            return Ok(PageOutcome::Stale);
        }

        let count = fetched.items.len();
        let exhausted = !fetched.has_more || count == 0;
        inner.state.items.extend(fetched.items);
        inner.state.page += 1;
        let evicted = inner.window.on_append(count);
        inner.state.phase = if exhausted {
            tracing::info!("Feed of {} exhausted after {} items", event, inner.state.items.len());
            FeedPhase::Exhausted
        } else {
            FeedPhase::Idle
        };
        drop(inner);

        Ok(PageOutcome::Appended {
            count,
            evicted,
            exhausted,
        })
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().generation == generation
    }

    pub fn event(&self) -> Option<EventId> {
        self.inner.lock().event.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn phase(&self) -> FeedPhase {
        self.inner.lock().state.phase
    }

    pub fn page(&self) -> u32 {
        self.inner.lock().state.page
    }

    pub fn item_count(&self) -> usize {
        self.inner.lock().state.items.len()
    }

    pub fn window(&self) -> Window {
        self.inner.lock().window
    }

    /// Shrink or grow the window ceiling; returns evicted count
    pub fn set_window_capacity(&self, capacity: usize) -> usize {
        self.inner.lock().window.set_capacity(capacity)
    }

    /// The items inside the render window, in feed order
    pub fn window_items(&self) -> Vec<ImageItem> {
        let inner = self.inner.lock();
        inner.window.slice(&inner.state.items).to_vec()
    }

    /// Look up any fetched item, including ones outside the window
    pub fn find(&self, id: &ImageId) -> Option<ImageItem> {
        self.inner
            .lock()
            .state
            .items
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    /// Copy of the full feed state
    pub fn state(&self) -> FeedState {
        self.inner.lock().state.clone()
    }
}
