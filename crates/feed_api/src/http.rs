//! reqwest-backed feed client

use crate::{ApiError, EventId, EventInfo, ImageFeedApi, ImageId, ImageItem, ImagesResponse, Page, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

/// HTTP client for the PixiAlbum feed service
#[derive(Clone)]
pub struct HttpFeedClient {
    base_url: Url,
    client: reqwest::Client,
    session_token: Option<String>,
}

impl HttpFeedClient {
    /// Create a client for `base_url`
    pub fn new(base_url: &str, timeout: Duration, session_token: Option<String>) -> Result<Self> {
        let base_url = parse_base(base_url)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            session_token,
        })
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let req = self.client.get(url);
        match self
            .session_token
            .as_deref()
            .and_then(|t| HeaderValue::from_str(&format!("jwt_token={t}")).ok())
        {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder, what: &str) -> Result<T> {
        let response = req.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body, what));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ImageFeedApi for HttpFeedClient {
    #[instrument(skip(self, event), fields(event = %event))]
    async fn fetch_page(&self, event: &EventId, page: u32, page_size: u32) -> Result<Page> {
        let url = page_url(&self.base_url, page, page_size)?;
        let req = self.get(url).header("event_id", event.as_str());
        let response: ImagesResponse = self.send_json(req, "images").await?;
        Ok(response.into())
    }

    #[instrument(skip(self, event, ids), fields(event = %event, count = ids.len()))]
    async fn fetch_by_ids(&self, event: &EventId, ids: &[ImageId]) -> Result<Vec<ImageItem>> {
        let url = liked_url(&self.base_url, event, ids)?;
        let response: ImagesResponse = self.send_json(self.get(url), "images").await?;
        Ok(response.images)
    }

    #[instrument(skip(self, event), fields(event = %event))]
    async fn fetch_event(&self, event: &EventId) -> Result<EventInfo> {
        let url = event_url(&self.base_url, event)?;
        self.send_json(self.get(url), event.as_str()).await
    }

    async fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url).map_err(|e| ApiError::Transport(format!("invalid image url: {e}")))?;
        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "", url.as_str()));
        }
        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn status_error(status: StatusCode, body: &str, what: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(what.to_string()),
        _ => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| "Request failed".to_string());
            ApiError::Status {
                code: status.as_u16(),
                message,
            }
        }
    }
}

/// Parse `base_url` as a directory so relative endpoints keep its path prefix
pub(crate) fn parse_base(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::Transport(format!("invalid base url: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::Transport(format!("invalid base url: {base_url}")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| ApiError::Transport(format!("invalid url {path}: {e}")))
}

pub(crate) fn page_url(base: &Url, page: u32, limit: u32) -> Result<Url> {
    let mut url = join(base, "v1/fetch/images")?;
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

pub(crate) fn liked_url(base: &Url, event: &EventId, ids: &[ImageId]) -> Result<Url> {
    let mut url = join(base, "v1/fetch/images/list")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("eventId", event.as_str());
        for id in ids {
            query.append_pair("imageIds", id.as_str());
        }
    }
    Ok(url)
}

pub(crate) fn event_url(base: &Url, event: &EventId) -> Result<Url> {
    let mut url = join(base, "v1/fetch/event/")?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Transport("base url cannot carry a path".into()))?
        .pop_if_empty()
        .push(event.as_str());
    Ok(url)
}
