//! Image Feed API definitions
//!
//! This crate defines the data structures exchanged with the PixiAlbum
//! image feed service and the async trait the gallery core consumes.

mod http;

pub use http::HttpFeedClient;

use async_trait::async_trait;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Image identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One image of an event gallery
///
/// The deployed service still emits the historical `imageId`, `rederUrl`
/// and `dowloadUrl` keys, so both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    #[serde(alias = "imageId")]
    pub id: ImageId,
    #[serde(alias = "rederUrl")]
    pub render_url: String,
    #[serde(alias = "dowloadUrl", default)]
    pub download_url: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
}

/// Result of a single page fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<ImageItem>,
    pub has_more: bool,
}

/// Wire shape of `/v1/fetch/images` and `/v1/fetch/images/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesResponse {
    #[serde(default)]
    pub images: Vec<ImageItem>,
    #[serde(default)]
    pub has_more_pages: bool,
}

impl From<ImagesResponse> for Page {
    fn from(r: ImagesResponse) -> Self {
        Page {
            items: r.images,
            has_more: r.has_more_pages,
        }
    }
}

/// Event metadata, only used to resolve a display title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    #[serde(rename = "eventId", alias = "id")]
    pub id: EventId,
    #[serde(rename = "eventName", alias = "name", default)]
    pub name: String,
}

/// Feed API errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Session rejected by server")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// The external image feed service
#[async_trait]
pub trait ImageFeedApi: Send + Sync {
    /// Fetch one page of an event's images (pages start at 1)
    async fn fetch_page(&self, event: &EventId, page: u32, page_size: u32) -> Result<Page>;

    /// Fetch the given images of an event
    async fn fetch_by_ids(&self, event: &EventId, ids: &[ImageId]) -> Result<Vec<ImageItem>>;

    /// Fetch event metadata
    async fn fetch_event(&self, event: &EventId) -> Result<EventInfo>;

    /// Download the raw bytes behind an image URL
    async fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
