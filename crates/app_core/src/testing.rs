//! Test doubles shared by the unit tests

use async_trait::async_trait;
use feed_api::{ApiError, EventId, EventInfo, ImageFeedApi, ImageId, ImageItem, Page};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

pub(crate) fn item(id: &str) -> ImageItem {
    ImageItem {
        id: ImageId::from(id),
        render_url: format!("https://cdn.test/render/{id}"),
        download_url: format!("https://cdn.test/download/{id}"),
        display_name: format!("{id}.jpg"),
    }
}

/// `count` items with ids `{prefix}-0`, `{prefix}-1`, ...
pub(crate) fn items(prefix: &str, count: usize) -> Vec<ImageItem> {
    (0..count).map(|i| item(&format!("{prefix}-{i}"))).collect()
}

/// A tiny valid PNG
pub(crate) fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 10, 10, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Page { event: EventId, page: u32, page_size: u32 },
    ByIds { event: EventId, ids: Vec<ImageId> },
    Event(EventId),
    Bytes(String),
}

enum ImageReply {
    Bytes(Vec<u8>),
    Hang,
}

/// Scripted `ImageFeedApi` that records every call
#[derive(Default)]
pub(crate) struct ScriptedFeed {
    pages: Mutex<VecDeque<Result<Page, ApiError>>>,
    liked: Mutex<VecDeque<Result<Vec<ImageItem>, ApiError>>>,
    events: Mutex<HashMap<EventId, EventInfo>>,
    images: Mutex<HashMap<String, ImageReply>>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedFeed {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Page and by-id fetches wait for a `notify_one` on the returned handle
    pub(crate) fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let feed = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (feed, gate)
    }

    pub(crate) fn page(self, items: Vec<ImageItem>, has_more: bool) -> Self {
        self.pages.lock().push_back(Ok(Page { items, has_more }));
        self
    }

    pub(crate) fn page_error(self, message: &str) -> Self {
        self.pages
            .lock()
            .push_back(Err(ApiError::Transport(message.to_string())));
        self
    }

    pub(crate) fn liked_error(self, message: &str) -> Self {
        self.liked
            .lock()
            .push_back(Err(ApiError::Status {
                code: 500,
                message: message.to_string(),
            }));
        self
    }

    pub(crate) fn event(self, id: &str, name: &str) -> Self {
        self.events.lock().insert(
            EventId::from(id),
            EventInfo {
                id: EventId::from(id),
                name: name.to_string(),
            },
        );
        self
    }

    pub(crate) fn image(self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.lock().insert(url.to_string(), ImageReply::Bytes(bytes));
        self
    }

    pub(crate) fn hanging_image(self, url: &str) -> Self {
        self.images.lock().insert(url.to_string(), ImageReply::Hang);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn page_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Page { .. }))
            .count()
    }

    pub(crate) fn by_id_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::ByIds { .. }))
            .count()
    }
}

#[async_trait]
impl ImageFeedApi for ScriptedFeed {
    async fn fetch_page(&self, event: &EventId, page: u32, page_size: u32) -> feed_api::Result<Page> {
        self.calls.lock().push(Call::Page {
            event: event.clone(),
            page,
            page_size,
        });
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.pages.lock().pop_front().unwrap_or_else(|| Ok(Page::default()))
    }

    async fn fetch_by_ids(&self, event: &EventId, ids: &[ImageId]) -> feed_api::Result<Vec<ImageItem>> {
        self.calls.lock().push(Call::ByIds {
            event: event.clone(),
            ids: ids.to_vec(),
        });
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.liked.lock().pop_front() {
            Some(reply) => reply,
            None => Ok(ids.iter().map(|id| item(id.as_str())).collect()),
        }
    }

    async fn fetch_event(&self, event: &EventId) -> feed_api::Result<EventInfo> {
        self.calls.lock().push(Call::Event(event.clone()));
        self.events
            .lock()
            .get(event)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(event.to_string()))
    }

    async fn fetch_image_bytes(&self, url: &str) -> feed_api::Result<Vec<u8>> {
        self.calls.lock().push(Call::Bytes(url.to_string()));
        let reply = match self.images.lock().get(url) {
            Some(ImageReply::Bytes(b)) => Some(b.clone()),
            Some(ImageReply::Hang) => None,
            None => return Err(ApiError::NotFound(url.to_string())),
        };
        match reply {
            Some(bytes) => Ok(bytes),
            None => futures::future::pending().await,
        }
    }
}
