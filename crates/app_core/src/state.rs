//! Gallery session state
//!
//! `GallerySession` is the one object a front end talks to. It owns the
//! main feed, the liked-only view, the like tracker of the open event and
//! the viewport-derived layout, and renders them into a `GalleryView`.

use crate::columns::{self, ColumnLayout, DeviceClass};
use crate::likes::{LikeTracker, PersistentLikeStore};
use crate::pagination::{FeedPhase, PageOutcome, PaginationController, SkipReason};
use crate::preloader::Preloader;
use crate::resource::DecodedCache;
use crate::scroll::{ScrollObservation, ScrollSource, ScrollTrigger};
use crate::view_mode::{ModeOutcome, ViewMode, ViewModeController};
use crate::window::Window;
use crate::{AppConfig, AppError};
use app_db::DurableStore;
use feed_api::{EventId, ImageFeedApi, ImageId, ImageItem};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Title shown until (or instead of) the event's own name
pub const DEFAULT_TITLE: &str = "Event Gallery";

/// A viewer this close to the end of the feed asks for the next page
const VIEWER_PREFETCH_DISTANCE: usize = 3;

/// Snapshot of everything a front end renders
#[derive(Debug, Clone)]
pub struct GalleryView {
    pub title: String,
    pub mode: ViewMode,
    pub columns: ColumnLayout,
    pub loading: bool,
    pub error_message: Option<String>,
    pub exhausted: bool,
    pub liked: HashSet<ImageId>,
    /// Items fetched for the event, including evicted ones
    pub item_count: usize,
    pub window: Window,
}

struct UiState {
    event: Option<EventId>,
    title: String,
    device: DeviceClass,
    scroll: ScrollTrigger,
    likes: Option<LikeTracker>,
    /// Last main-feed failure; cleared by the next merged page
    feed_error: Option<String>,
    /// Event lookup and like storage problems
    notice: Option<String>,
}

/// Main gallery session
pub struct GallerySession {
    config: AppConfig,
    api: Arc<dyn ImageFeedApi>,
    likes_store: PersistentLikeStore,
    cache: Arc<DecodedCache>,
    feed: PaginationController,
    view: ViewModeController,
    ui: Mutex<UiState>,
}

impl GallerySession {
    /// Create a session with no event open
    pub fn new(config: AppConfig, api: Arc<dyn ImageFeedApi>, store: Arc<dyn DurableStore>) -> Result<Self, AppError> {
        config.validate()?;

        let device = DeviceClass::Wide;
        let cache = Arc::new(DecodedCache::new(
            config.feed.decode_cache_entries,
            config.feed.decode_cache_max_bytes,
        ));
        let preloader = Preloader::new(api.clone(), cache.clone(), &config.feed);
        let feed = PaginationController::new(
            api.clone(),
            preloader,
            config.feed.page_size,
            capacity_for(&config, device),
        );

        let ui = UiState {
            event: None,
            title: DEFAULT_TITLE.to_string(),
            device,
            scroll: ScrollTrigger::new(&config.scroll),
            likes: None,
            feed_error: None,
            notice: None,
        };

        Ok(Self {
            view: ViewModeController::new(api.clone()),
            likes_store: PersistentLikeStore::new(store),
            config,
            api,
            cache,
            feed,
            ui: Mutex::new(ui),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<DecodedCache> {
        &self.cache
    }

    pub fn event(&self) -> Option<EventId> {
        self.ui.lock().event.clone()
    }

    /// Switch to `event` and load its first page.
    ///
    /// Anything still in flight for the previous event is discarded when it
    /// lands. A missing event keeps the default title and reports it, but
    /// the feed is still requested.
    pub async fn open_event(&self, event: EventId) -> Result<PageOutcome, AppError> {
        tracing::info!("Opening event {}", event);

        let capacity = {
            let mut ui = self.ui.lock();
            ui.event = Some(event.clone());
            ui.title = DEFAULT_TITLE.to_string();
            ui.feed_error = None;
            ui.notice = None;
            ui.scroll.reset();

            let mut tracker = LikeTracker::open(event.clone(), self.likes_store.clone());
            if let Err(e) = tracker.hydrate() {
                tracing::warn!("Loading liked images of {} failed: {}", event, e);
                ui.notice = Some(e.user_message());
            }
            ui.likes = Some(tracker);
            capacity_for(&self.config, ui.device)
        };
        self.view.reset();
        self.cache.clear();
        let generation = self.feed.reset(Some(event.clone()), self.config.feed.page_size, capacity);

        let info = self.api.fetch_event(&event).await;
        if self.feed.generation() != generation {
            return Ok(PageOutcome::Stale);
        }
        {
            let mut ui = self.ui.lock();
            match info {
                Ok(info) if !info.name.is_empty() => ui.title = info.name,
                Ok(_) => {}
                Err(e) => {
                    let e = AppError::from(e);
                    tracing::warn!("Looking up event {} failed: {}", event, e);
                    ui.notice = Some(e.user_message());
                }
            }
        }

        self.request_next_page().await
    }

    /// Load the next page of the main feed.
    ///
    /// A no-op in liked-only mode, while a fetch is in flight, or once the
    /// feed is exhausted.
    pub async fn request_next_page(&self) -> Result<PageOutcome, AppError> {
        if self.view.mode() == ViewMode::LikedOnly {
            return Ok(PageOutcome::Skipped(SkipReason::LikedOnly));
        }

        match self.feed.request_next_page().await {
            Ok(outcome) => {
                if matches!(outcome, PageOutcome::Appended { .. }) {
                    self.ui.lock().feed_error = None;
                }
                Ok(outcome)
            }
            Err(e) => {
                self.ui.lock().feed_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Flip the like state of `id` and persist it; returns the new state.
    ///
    /// In liked-only mode the liked feed is refetched to match.
    pub async fn toggle_like(&self, id: ImageId) -> Result<bool, AppError> {
        let (event, liked, ids) = {
            let mut ui = self.ui.lock();
            let Some(tracker) = ui.likes.as_mut() else {
                return Err(no_event());
            };
            let toggled = tracker.toggle(id);
            let event = tracker.event().clone();
            let ids = tracker.sorted_ids();
            match toggled {
                Ok(liked) => (event, liked, ids),
                Err(e) => {
                    tracing::warn!("Saving liked images of {} failed: {}", event, e);
                    ui.notice = Some(e.user_message());
                    return Err(e);
                }
            }
        };

        if self.view.mode() == ViewMode::LikedOnly {
            if let Err(e) = self.view.set_mode(ViewMode::LikedOnly, &event, ids).await {
                tracing::debug!("Liked feed refresh failed: {}", e);
            }
        }
        Ok(liked)
    }

    pub fn is_liked(&self, id: &ImageId) -> bool {
        self.ui
            .lock()
            .likes
            .as_ref()
            .is_some_and(|tracker| tracker.is_liked(id))
    }

    /// Switch between the main feed and the liked-only view.
    ///
    /// Retries loading stored likes when the earlier attempt failed, so the
    /// liked view never shows an empty set in place of unread likes.
    pub async fn set_mode(&self, mode: ViewMode) -> Result<ModeOutcome, AppError> {
        let (event, ids) = {
            let mut guard = self.ui.lock();
            let ui = &mut *guard;
            let Some(tracker) = ui.likes.as_mut() else {
                return Err(no_event());
            };
            if !tracker.is_hydrated() {
                if let Err(e) = tracker.hydrate() {
                    tracing::warn!("Loading liked images of {} failed: {}", tracker.event(), e);
                    ui.notice = Some(e.user_message());
                    return Err(e);
                }
                ui.notice = None;
            }
            let pair = (tracker.event().clone(), tracker.sorted_ids());
            ui.scroll.reset();
            pair
        };
        tracing::debug!("View mode {:?} for {}", mode, event);
        self.view.set_mode(mode, &event, ids).await
    }

    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    /// Apply a new viewport width; returns how many items left the window
    pub fn set_viewport_width(&self, width: u32) -> usize {
        let device = DeviceClass::from_width(width, &self.config.layout);
        let previous = std::mem::replace(&mut self.ui.lock().device, device);
        if previous != device {
            tracing::debug!("Viewport {}px: {:?} -> {:?}", width, previous, device);
        }
        self.feed.set_window_capacity(capacity_for(&self.config, device))
    }

    pub fn column_count(&self) -> usize {
        self.ui.lock().device.column_count()
    }

    /// Feed a scroll sample; requests a page when it enters the load zone.
    ///
    /// Ignored in liked-only mode, where the zone edge stays unconsumed.
    pub async fn on_scroll(&self, obs: ScrollObservation) -> Result<Option<PageOutcome>, AppError> {
        if self.view.mode() == ViewMode::LikedOnly {
            return Ok(None);
        }
        let fire = self.ui.lock().scroll.observe(obs);
        if !fire {
            return Ok(None);
        }
        tracing::debug!("Scroll at {:.0}/{:.0} entered load zone", obs.offset, obs.content_height);
        self.request_next_page().await.map(Some)
    }

    /// Route samples from `source` until it closes; returns merged pages
    pub async fn drive_scroll<S: ScrollSource>(&self, source: &mut S) -> usize {
        let mut merged = 0;
        while let Some(obs) = source.next_observation().await {
            match self.on_scroll(obs).await {
                Ok(Some(PageOutcome::Appended { .. })) => merged += 1,
                Ok(_) => {}
                Err(e) => tracing::debug!("Scroll-triggered page failed: {}", e),
            }
        }
        merged
    }

    /// A full-screen viewer moved to `index` of `len` main-feed items
    pub async fn viewer_position_changed(&self, index: usize, len: usize) -> Result<Option<PageOutcome>, AppError> {
        if self.view.mode() == ViewMode::LikedOnly || len == 0 {
            return Ok(None);
        }
        if index + VIEWER_PREFETCH_DISTANCE < len {
            return Ok(None);
        }
        self.request_next_page().await.map(Some)
    }

    /// Download link of any fetched image, including evicted ones
    pub fn download_url(&self, id: &ImageId) -> Option<String> {
        let item = self
            .feed
            .find(id)
            .or_else(|| self.view.liked_feed().into_iter().find(|item| &item.id == id))?;
        Some(link_of(item))
    }

    /// Render the current state
    pub fn view(&self) -> GalleryView {
        let mode = self.view.mode();
        let (title, column_count, liked, feed_error, notice) = {
            let ui = self.ui.lock();
            let liked = ui
                .likes
                .as_ref()
                .map(|tracker| tracker.ids().clone())
                .unwrap_or_default();
            (
                ui.title.clone(),
                ui.device.column_count(),
                liked,
                ui.feed_error.clone(),
                ui.notice.clone(),
            )
        };

        let phase = self.feed.phase();
        let (visible, loading, error) = match mode {
            ViewMode::All => (self.feed.window_items(), phase == FeedPhase::Fetching, feed_error),
            ViewMode::LikedOnly => (self.view.liked_feed(), self.view.is_loading(), self.view.error()),
        };

        GalleryView {
            title,
            mode,
            columns: columns::assign(&visible, column_count),
            loading,
            error_message: error.or(notice),
            exhausted: phase == FeedPhase::Exhausted,
            liked,
            item_count: self.feed.item_count(),
            window: self.feed.window(),
        }
    }
}

fn capacity_for(config: &AppConfig, device: DeviceClass) -> usize {
    match device {
        DeviceClass::Compact => config.feed.window_capacity_compact,
        DeviceClass::Medium | DeviceClass::Wide => config.feed.window_capacity_desktop,
    }
}

fn link_of(item: ImageItem) -> String {
    if item.download_url.is_empty() {
        item.render_url
    } else {
        item.download_url
    }
}

fn no_event() -> AppError {
    AppError::NotFound("Open event".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{items, png_bytes, Call, ScriptedFeed};
    use app_db::{DbError, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` reads
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicUsize,
    }

    impl DurableStore for FlakyStore {
        fn get(&self, key: &str) -> app_db::Result<Option<String>> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(DbError::Pool("storage unavailable".into()));
            }
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> app_db::Result<()> {
            self.inner.put(key, value)
        }
    }

    fn config(page_size: u32) -> AppConfig {
        let mut config = AppConfig::default();
        config.feed.page_size = page_size;
        config.feed.preload_count = 0;
        config
    }

    fn session_with(feed: Arc<ScriptedFeed>, config: AppConfig) -> (GallerySession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session = GallerySession::new(config, feed, store.clone()).unwrap();
        (session, store)
    }

    fn in_zone() -> ScrollObservation {
        ScrollObservation {
            offset: 8_100.0,
            content_height: 10_000.0,
        }
    }

    #[tokio::test]
    async fn test_first_page_fills_three_columns() {
        let feed = Arc::new(ScriptedFeed::new().event("e1", "Summer Party").page(items("p", 3), true));
        let (session, _) = session_with(feed, config(3));
        session.set_viewport_width(1400);

        session.open_event(EventId::from("e1")).await.unwrap();

        let view = session.view();
        assert_eq!(view.title, "Summer Party");
        assert_eq!(view.columns.column_count(), 3);
        for (i, column) in view.columns.columns().iter().enumerate() {
            assert_eq!(column.len(), 1);
            assert_eq!(column[0].id, ImageId::from(format!("p-{i}").as_str()));
        }
        assert!(!view.loading);
        assert!(!view.exhausted);
    }

    #[tokio::test]
    async fn test_empty_page_exhausts_and_stops_fetching() {
        let feed = Arc::new(ScriptedFeed::new().page(items("p", 3), true).page(vec![], true));
        let (session, _) = session_with(feed.clone(), config(3));

        session.open_event(EventId::from("e1")).await.unwrap();
        session.request_next_page().await.unwrap();
        assert!(session.view().exhausted);

        assert_eq!(
            session.on_scroll(in_zone()).await.unwrap(),
            Some(PageOutcome::Skipped(SkipReason::Exhausted))
        );
        session.request_next_page().await.unwrap();
        assert_eq!(feed.page_calls(), 2);
        assert_eq!(session.view().item_count, 3);
    }

    #[tokio::test]
    async fn test_toggle_twice_unpersists() {
        let feed = Arc::new(ScriptedFeed::new().page(items("p", 3), true));
        let (session, store) = session_with(feed, config(3));
        let event = EventId::from("e1");
        session.open_event(event.clone()).await.unwrap();

        let a = ImageId::from("A");
        assert!(session.toggle_like(a.clone()).await.unwrap());
        assert!(session.is_liked(&a));
        assert!(!session.toggle_like(a.clone()).await.unwrap());
        assert!(!session.is_liked(&a));

        let persisted = PersistentLikeStore::new(store).load(&event).unwrap();
        assert!(!persisted.contains(&a));
    }

    #[tokio::test]
    async fn test_likes_survive_reopen() {
        let feed = Arc::new(ScriptedFeed::new());
        let (session, store) = session_with(feed.clone(), config(3));
        session.open_event(EventId::from("e1")).await.unwrap();
        session.toggle_like(ImageId::from("A")).await.unwrap();

        let reopened = GallerySession::new(config(3), feed, store).unwrap();
        reopened.open_event(EventId::from("e1")).await.unwrap();
        assert!(reopened.is_liked(&ImageId::from("A")));
        assert!(reopened.view().liked.contains(&ImageId::from("A")));
    }

    #[tokio::test]
    async fn test_liked_only_with_no_likes_makes_no_calls() {
        let feed = Arc::new(ScriptedFeed::new().page(items("p", 3), true));
        let (session, _) = session_with(feed.clone(), config(3));
        session.open_event(EventId::from("e1")).await.unwrap();

        session.set_mode(ViewMode::LikedOnly).await.unwrap();

        let view = session.view();
        assert_eq!(view.mode, ViewMode::LikedOnly);
        assert!(view.columns.is_empty());
        assert_eq!(feed.by_id_calls(), 0);
    }

    #[tokio::test]
    async fn test_liked_only_round_trip_restores_feed() {
        let feed = Arc::new(ScriptedFeed::new().page(items("p", 3), true));
        let (session, _) = session_with(feed.clone(), config(3));
        session.open_event(EventId::from("e1")).await.unwrap();
        session.toggle_like(ImageId::from("p-2")).await.unwrap();
        session.toggle_like(ImageId::from("p-0")).await.unwrap();

        session.set_mode(ViewMode::LikedOnly).await.unwrap();
        let liked = session.view();
        assert_eq!(liked.columns.item_count(), 2);
        assert!(matches!(
            feed.calls().last(),
            Some(Call::ByIds { ids, .. }) if ids == &vec![ImageId::from("p-0"), ImageId::from("p-2")]
        ));

        // No paging while liked-only
        assert_eq!(
            session.request_next_page().await.unwrap(),
            PageOutcome::Skipped(SkipReason::LikedOnly)
        );
        assert_eq!(session.viewer_position_changed(1, 2).await.unwrap(), None);

        // Unliking refreshes the liked view
        session.toggle_like(ImageId::from("p-0")).await.unwrap();
        assert_eq!(session.view().columns.item_count(), 1);

        session.set_mode(ViewMode::All).await.unwrap();
        let all = session.view();
        assert_eq!(all.columns.item_count(), 3);
        assert_eq!(feed.page_calls(), 1);
    }

    #[tokio::test]
    async fn test_liked_fetch_failure_keeps_main_feed() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .event("e1", "Gala")
                .page(items("p", 3), true)
                .liked_error("down"),
        );
        let (session, _) = session_with(feed, config(3));
        session.open_event(EventId::from("e1")).await.unwrap();
        session.toggle_like(ImageId::from("p-1")).await.unwrap();

        assert!(session.set_mode(ViewMode::LikedOnly).await.is_err());
        let view = session.view();
        assert!(view.columns.is_empty());
        assert!(view.error_message.is_some());

        session.set_mode(ViewMode::All).await.unwrap();
        let view = session.view();
        assert_eq!(view.columns.item_count(), 3);
        assert!(view.error_message.is_none());
    }

    #[tokio::test]
    async fn test_scroll_and_manual_trigger_share_one_fetch() {
        let (feed, gate) = ScriptedFeed::gated();
        let feed = Arc::new(feed.page(items("a", 3), true).page(items("b", 3), true));
        let (session, _) = session_with(feed.clone(), config(3));

        gate.notify_one();
        session.open_event(EventId::from("e1")).await.unwrap();

        let scroll = session.on_scroll(in_zone());
        let manual = async {
            let outcome = session.request_next_page().await;
            assert!(session.view().loading);
            gate.notify_one();
            outcome
        };
        let (scroll, manual) = tokio::join!(scroll, manual);

        assert_eq!(manual.unwrap(), PageOutcome::Skipped(SkipReason::InFlight));
        assert!(matches!(scroll.unwrap(), Some(PageOutcome::Appended { count: 3, .. })));
        assert_eq!(feed.page_calls(), 2);
        assert_eq!(session.view().item_count, 6);
    }

    #[tokio::test]
    async fn test_drive_scroll_fires_per_zone_entry() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .page(items("a", 3), true)
                .page(items("b", 3), true)
                .page(items("c", 3), true),
        );
        let (session, _) = session_with(feed.clone(), config(3));
        session.open_event(EventId::from("e1")).await.unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        for offset in [8_100.0, 8_200.0, 8_300.0, 100.0, 8_050.0] {
            tx.send(ScrollObservation {
                offset,
                content_height: 10_000.0,
            })
            .await
            .unwrap();
        }
        drop(tx);

        assert_eq!(session.drive_scroll(&mut rx).await, 2);
        assert_eq!(feed.page_calls(), 3);
    }

    #[tokio::test]
    async fn test_unknown_event_keeps_default_title() {
        let feed = Arc::new(ScriptedFeed::new().page(items("p", 2), true));
        let (session, _) = session_with(feed.clone(), config(3));

        session.open_event(EventId::from("ghost")).await.unwrap();

        let view = session.view();
        assert_eq!(view.title, DEFAULT_TITLE);
        assert!(view.error_message.unwrap().contains("not found"));
        assert_eq!(view.item_count, 2);
        assert_eq!(feed.page_calls(), 1);
    }

    #[tokio::test]
    async fn test_page_failure_reported_then_cleared() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .event("e1", "Gala")
                .page_error("timeout")
                .page(items("p", 3), true),
        );
        let (session, _) = session_with(feed, config(3));

        assert!(session.open_event(EventId::from("e1")).await.is_err());
        let view = session.view();
        assert!(view.error_message.unwrap().contains("timeout"));
        assert!(!view.loading);

        session.request_next_page().await.unwrap();
        let view = session.view();
        assert!(view.error_message.is_none());
        assert_eq!(view.item_count, 3);
    }

    #[tokio::test]
    async fn test_event_switch_discards_stale_page() {
        let (feed, gate) = ScriptedFeed::gated();
        let feed = Arc::new(
            feed.event("e1", "First")
                .event("e2", "Second")
                .page(items("x", 2), true)
                .page(items("y", 2), true),
        );
        let (session, _) = session_with(feed.clone(), config(2));

        let first = session.open_event(EventId::from("e1"));
        let second = async {
            tokio::task::yield_now().await;
            session.open_event(EventId::from("e2")).await
        };
        let release = async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            gate.notify_waiters();
        };
        let (first, second, _) = tokio::join!(first, second, release);

        assert_eq!(first.unwrap(), PageOutcome::Stale);
        assert!(matches!(second.unwrap(), PageOutcome::Appended { count: 2, .. }));

        let view = session.view();
        assert_eq!(view.title, "Second");
        assert_eq!(view.item_count, 2);
        assert_eq!(session.event(), Some(EventId::from("e2")));
    }

    #[tokio::test]
    async fn test_viewer_prefetch_near_end() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .page(items("a", 6), true)
                .page(items("b", 6), true),
        );
        let (session, _) = session_with(feed.clone(), config(6));
        session.open_event(EventId::from("e1")).await.unwrap();

        assert_eq!(session.viewer_position_changed(2, 6).await.unwrap(), None);
        assert!(matches!(
            session.viewer_position_changed(3, 6).await.unwrap(),
            Some(PageOutcome::Appended { count: 6, .. })
        ));
        assert_eq!(feed.page_calls(), 2);
    }

    #[tokio::test]
    async fn test_compact_viewport_shrinks_window() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .page(items("a", 4), true)
                .page(items("b", 4), true),
        );
        let mut cfg = config(4);
        cfg.feed.window_capacity_compact = 5;
        let (session, _) = session_with(feed, cfg);
        session.open_event(EventId::from("e1")).await.unwrap();
        session.request_next_page().await.unwrap();
        assert_eq!(session.view().columns.item_count(), 8);

        assert_eq!(session.set_viewport_width(400), 3);
        let view = session.view();
        assert_eq!(view.columns.column_count(), 1);
        assert_eq!(view.columns.item_count(), 5);
        assert_eq!(view.window.range(), 3..8);

        // Evicted items still resolve
        assert_eq!(
            session.download_url(&ImageId::from("a-0")).as_deref(),
            Some("https://cdn.test/download/a-0")
        );

        session.set_viewport_width(900);
        assert_eq!(session.column_count(), 2);
    }

    #[tokio::test]
    async fn test_like_without_event_is_rejected() {
        let (session, _) = session_with(Arc::new(ScriptedFeed::new()), config(3));
        assert!(session.toggle_like(ImageId::from("a")).await.is_err());
        assert!(!session.is_liked(&ImageId::from("a")));
        assert_eq!(
            session.request_next_page().await.unwrap(),
            PageOutcome::Skipped(SkipReason::NoEvent)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = AppConfig::default();
        cfg.feed.page_size = 0;
        let result = GallerySession::new(cfg, Arc::new(ScriptedFeed::new()), Arc::new(MemoryStore::new()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_event_switch_clears_decoded_images() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .page(items("a", 3), true)
                .page(items("b", 2), true)
                .image("https://cdn.test/render/a-0", png_bytes())
                .image("https://cdn.test/render/a-1", png_bytes())
                .image("https://cdn.test/render/a-2", png_bytes()),
        );
        let mut cfg = config(3);
        cfg.feed.preload_count = 3;
        let (session, _) = session_with(feed, cfg);

        session.open_event(EventId::from("e1")).await.unwrap();
        assert_eq!(session.cache().stats().entries, 3);

        session.open_event(EventId::from("e2")).await.unwrap();
        let cache = session.cache();
        assert!(!cache.contains(&ImageId::from("a-0")));
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().bytes, 0);
        assert_eq!(session.view().item_count, 2);
    }

    #[tokio::test]
    async fn test_scroll_in_liked_only_keeps_zone_edge() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .page(items("a", 3), true)
                .page(items("b", 3), true),
        );
        let (session, _) = session_with(feed.clone(), config(3));
        session.open_event(EventId::from("e1")).await.unwrap();
        session.toggle_like(ImageId::from("a-1")).await.unwrap();
        session.set_mode(ViewMode::LikedOnly).await.unwrap();

        assert_eq!(session.on_scroll(in_zone()).await.unwrap(), None);
        assert_eq!(feed.page_calls(), 1);

        // Back on the main feed the zone fires again
        session.set_mode(ViewMode::All).await.unwrap();
        assert!(matches!(
            session.on_scroll(in_zone()).await.unwrap(),
            Some(PageOutcome::Appended { count: 3, .. })
        ));
        assert_eq!(feed.page_calls(), 2);
    }

    #[tokio::test]
    async fn test_liked_only_retries_failed_hydration() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(0),
        });
        PersistentLikeStore::new(store.clone())
            .save(&EventId::from("e1"), &[ImageId::from("A")].into_iter().collect())
            .unwrap();
        store.failures.store(1, Ordering::SeqCst);

        let feed = Arc::new(ScriptedFeed::new().event("e1", "Gala").page(items("p", 3), true));
        let session = GallerySession::new(config(3), feed.clone(), store).unwrap();
        session.open_event(EventId::from("e1")).await.unwrap();
        assert!(!session.is_liked(&ImageId::from("A")));
        assert!(session.view().error_message.is_some());

        session.set_mode(ViewMode::LikedOnly).await.unwrap();

        let view = session.view();
        assert_eq!(feed.by_id_calls(), 1);
        assert_eq!(view.columns.item_count(), 1);
        assert!(view.error_message.is_none());
        assert!(session.is_liked(&ImageId::from("A")));
    }

    #[tokio::test]
    async fn test_liked_only_reports_persistent_storage_failure() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(usize::MAX),
        });
        let feed = Arc::new(ScriptedFeed::new().event("e1", "Gala").page(items("p", 3), true));
        let session = GallerySession::new(config(3), feed.clone(), store).unwrap();
        session.open_event(EventId::from("e1")).await.unwrap();

        assert!(session.set_mode(ViewMode::LikedOnly).await.is_err());
        assert_eq!(session.mode(), ViewMode::All);
        assert_eq!(feed.by_id_calls(), 0);
        assert!(session.view().error_message.is_some());
    }
}
