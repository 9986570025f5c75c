//! PixiAlbum Core Domain Logic
//!
//! This crate contains:
//! - Gallery session state
//! - Paged feed loading with a bounded render window
//! - Column layout and scroll triggers
//! - Like tracking and the liked-only view
//! - Configuration and error types

pub mod state;
pub mod config;
pub mod error;
pub mod pagination;
pub mod preloader;
pub mod resource;
pub mod window;
pub mod columns;
pub mod scroll;
pub mod likes;
pub mod view_mode;

#[cfg(test)]
mod testing;

pub use state::{GallerySession, GalleryView, DEFAULT_TITLE};
pub use config::{AppConfig, ApiConfig, FeedConfig, LayoutConfig, ScrollConfig, StorageConfig};
pub use error::AppError;
pub use pagination::{FeedPhase, FeedState, PageOutcome, PaginationController, SkipReason};
pub use preloader::{decode_image, Preloader, WarmReport};
pub use resource::{CacheStats, DecodedCache, DecodedImage};
pub use window::Window;
pub use columns::{assign, column_count_for_width, ColumnLayout, DeviceClass};
pub use scroll::{ScrollObservation, ScrollSource, ScrollTrigger};
pub use likes::{LikeTracker, PersistentLikeStore, LIKES_KEY};
pub use view_mode::{ModeOutcome, ViewMode, ViewModeController};

pub use feed_api::{EventId, ImageFeedApi, ImageId, ImageItem};
