//! All / liked-only view switching
//!
//! The liked-only feed is fetched by id, kept apart from the main feed and
//! thrown away when the view returns to `All`.

use crate::AppError;
use feed_api::{EventId, ImageFeedApi, ImageId, ImageItem};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "liked")]
    LikedOnly,
}

/// Result of `set_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOutcome {
    Showing { mode: ViewMode, count: usize },
    /// The mode changed again before the liked fetch returned
    Stale,
}

#[derive(Default)]
struct Inner {
    mode: ViewMode,
    liked_feed: Vec<ImageItem>,
    epoch: u64,
    loading: bool,
    error: Option<String>,
}

pub struct ViewModeController {
    api: Arc<dyn ImageFeedApi>,
    inner: Mutex<Inner>,
}

impl ViewModeController {
    pub fn new(api: Arc<dyn ImageFeedApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Switch views. `liked` is only consulted for `LikedOnly`.
    ///
    /// An empty liked set never touches the network. A failed liked fetch
    /// shows an empty liked view with an error message.
    pub async fn set_mode(&self, mode: ViewMode, event: &EventId, liked: Vec<ImageId>) -> Result<ModeOutcome, AppError> {
        let epoch = {
            let mut inner = self.inner.lock();
            inner.epoch += 1;
            inner.mode = mode;
            inner.liked_feed.clear();
            inner.error = None;
            inner.loading = mode == ViewMode::LikedOnly && !liked.is_empty();
            inner.epoch
        };

        if mode == ViewMode::All || liked.is_empty() {
            return Ok(ModeOutcome::Showing { mode, count: 0 });
        }

        tracing::debug!("Fetching {} liked images of {}", liked.len(), event);
        let fetched = self.api.fetch_by_ids(event, &liked).await;

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            return Ok(ModeOutcome::Stale);
        }
        inner.loading = false;
        match fetched {
            Ok(items) => {
                let count = items.len();
                inner.liked_feed = items;
                Ok(ModeOutcome::Showing { mode, count })
            }
            Err(e) => {
                let e = AppError::from(e);
                tracing::warn!("Fetching liked images of {} failed: {}", event, e);
                inner.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Back to `All` without any fetch
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.mode = ViewMode::All;
        inner.liked_feed.clear();
        inner.loading = false;
        inner.error = None;
    }

    pub fn mode(&self) -> ViewMode {
        self.inner.lock().mode
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    pub fn liked_feed(&self) -> Vec<ImageItem> {
        self.inner.lock().liked_feed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedFeed;

    fn ids(list: &[&str]) -> Vec<ImageId> {
        list.iter().map(|s| ImageId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_empty_liked_set_makes_no_calls() {
        let feed = Arc::new(ScriptedFeed::new());
        let ctl = ViewModeController::new(feed.clone());

        let outcome = ctl
            .set_mode(ViewMode::LikedOnly, &EventId::from("e1"), vec![])
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ModeOutcome::Showing {
                mode: ViewMode::LikedOnly,
                count: 0
            }
        );
        assert!(feed.calls().is_empty());
        assert!(!ctl.is_loading());
        assert!(ctl.liked_feed().is_empty());
    }

    #[tokio::test]
    async fn test_liked_fetch_and_discard() {
        let feed = Arc::new(ScriptedFeed::new());
        let ctl = ViewModeController::new(feed.clone());
        let event = EventId::from("e1");

        ctl.set_mode(ViewMode::LikedOnly, &event, ids(&["a", "b"]))
            .await
            .unwrap();
        assert_eq!(ctl.liked_feed().len(), 2);
        assert_eq!(feed.by_id_calls(), 1);

        ctl.set_mode(ViewMode::All, &event, ids(&["a", "b"])).await.unwrap();
        assert_eq!(ctl.mode(), ViewMode::All);
        assert!(ctl.liked_feed().is_empty());
        assert_eq!(feed.by_id_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_shows_empty_with_error() {
        let feed = Arc::new(ScriptedFeed::new().liked_error("db down"));
        let ctl = ViewModeController::new(feed);

        let result = ctl
            .set_mode(ViewMode::LikedOnly, &EventId::from("e1"), ids(&["a"]))
            .await;

        assert!(result.is_err());
        assert_eq!(ctl.mode(), ViewMode::LikedOnly);
        assert!(ctl.liked_feed().is_empty());
        assert!(ctl.error().unwrap().contains("db down"));
        assert!(!ctl.is_loading());
    }

    #[tokio::test]
    async fn test_late_liked_response_dropped() {
        let (feed, gate) = ScriptedFeed::gated();
        let ctl = ViewModeController::new(Arc::new(feed));
        let event = EventId::from("e1");

        let liked = ctl.set_mode(ViewMode::LikedOnly, &event, ids(&["a"]));
        let switch = async {
            tokio::task::yield_now().await;
            ctl.reset();
            gate.notify_one();
        };
        let (outcome, _) = tokio::join!(liked, switch);

        assert_eq!(outcome.unwrap(), ModeOutcome::Stale);
        assert_eq!(ctl.mode(), ViewMode::All);
        assert!(ctl.liked_feed().is_empty());
    }
}
