//! Decode warm-up for freshly fetched pages
//!
//! Before a page is merged into the feed, the first few images are
//! downloaded and decoded off the visible tree so the viewport does not
//! pop in. Every attempt is bounded by a timeout, and failures are soft:
//! they are logged and the merge goes ahead anyway.

use crate::config::FeedConfig;
use crate::resource::{DecodedCache, DecodedImage};
use crate::AppError;
use feed_api::{ImageFeedApi, ImageItem};
use image::ImageReader;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use xxhash_rust::xxh3::xxh3_64;

/// Outcome of warming one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub warmed: usize,
    pub cached: usize,
    pub failed: usize,
    pub timed_out: usize,
}

pub struct Preloader {
    api: Arc<dyn ImageFeedApi>,
    cache: Arc<DecodedCache>,
    count: usize,
    timeout: Duration,
}

impl Preloader {
    pub fn new(api: Arc<dyn ImageFeedApi>, cache: Arc<DecodedCache>, config: &FeedConfig) -> Self {
        Self {
            api,
            cache,
            count: config.preload_count,
            timeout: config.decode_timeout(),
        }
    }

    /// Warm the first `preload_count` images of `items`.
    ///
    /// Completes after at most one decode timeout.
    pub async fn warm(&self, items: &[ImageItem]) -> WarmReport {
        let head = &items[..items.len().min(self.count)];
        let results = futures::future::join_all(head.iter().map(|item| self.warm_one(item))).await;

        let mut report = WarmReport::default();
        for (item, result) in head.iter().zip(results) {
            match result {
                Ok(true) => report.warmed += 1,
                Ok(false) => report.cached += 1,
                Err(e @ AppError::DecodeTimeout { .. }) => {
                    tracing::warn!("{}", e);
                    report.timed_out += 1;
                }
                Err(e) => {
                    tracing::warn!("Preload of {} failed: {}", item.id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(?report, "Page warm-up finished");
        report
    }

    /// Returns false when the image was already cached
    async fn warm_one(&self, item: &ImageItem) -> Result<bool, AppError> {
        if self.cache.contains(&item.id) {
            return Ok(false);
        }

        let attempt = async {
            let bytes = self.api.fetch_image_bytes(&item.render_url).await?;
            let decoded = tokio::task::spawn_blocking(move || decode_image(&bytes))
                .await
                .map_err(|e| AppError::ImageDecode(e.to_string()))??;
            Ok::<DecodedImage, AppError>(decoded)
        };

        let decoded = tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| AppError::DecodeTimeout {
                id: item.id.clone(),
                after_ms: self.timeout.as_millis() as u64,
            })??;

        self.cache.insert(item.id.clone(), decoded);
        Ok(true)
    }
}

/// Decode encoded image bytes to RGBA8
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, AppError> {
    let hash = xxh3_64(bytes);

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(e.to_string()))?
        .decode()?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        data: rgba.into_raw(),
        hash,
    })
}
