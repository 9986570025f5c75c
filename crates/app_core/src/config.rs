//! Application configuration

use crate::AppError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub layout: LayoutConfig,
    pub scroll: ScrollConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Sent as the `jwt_token` cookie when present
    pub session_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pixialbum.com".to_string(),
            request_timeout_ms: 15_000,
            session_token: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Feed paging, windowing and preloading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: u32,
    /// Max materialized items on wide viewports
    pub window_capacity_desktop: usize,
    /// Max materialized items on compact (phone) viewports
    pub window_capacity_compact: usize,
    /// Images decoded ahead of each page merge
    pub preload_count: usize,
    pub decode_timeout_ms: u64,
    /// Max decoded entries kept for the open event
    pub decode_cache_entries: usize,
    /// Max decoded RGBA bytes kept for the open event
    pub decode_cache_max_bytes: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            window_capacity_desktop: 30,
            window_capacity_compact: 30,
            preload_count: 3,
            decode_timeout_ms: 4_000,
            decode_cache_entries: 30,
            decode_cache_max_bytes: 64 * 1024 * 1024,
        }
    }
}

impl FeedConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }
}

/// Responsive column breakpoints (viewport widths in px)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub compact_max_width: u32,
    pub medium_max_width: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact_max_width: 700,
            medium_max_width: 1024,
        }
    }
}

/// Infinite scroll trigger zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Distance from the content end where the zone starts
    pub bottom_margin: f64,
    pub zone_height: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            bottom_margin: 2000.0,
            zone_height: 500.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the default database location
    pub database_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let config_path = Self::config_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        self.validate()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "PixiAlbum", "PixiAlbum")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Reject values the feed cannot work with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.feed.page_size == 0 {
            return Err(AppError::Config("feed.page_size must be > 0".into()));
        }
        if self.feed.window_capacity_desktop == 0 || self.feed.window_capacity_compact == 0 {
            return Err(AppError::Config("feed window capacity must be > 0".into()));
        }
        if self.feed.decode_cache_entries == 0 || self.feed.decode_cache_max_bytes == 0 {
            return Err(AppError::Config("feed decode cache bounds must be > 0".into()));
        }
        if self.layout.compact_max_width >= self.layout.medium_max_width {
            return Err(AppError::Config(
                "layout.compact_max_width must be below layout.medium_max_width".into(),
            ));
        }
        if self.scroll.zone_height <= 0.0 || self.scroll.bottom_margin < 0.0 {
            return Err(AppError::Config("scroll zone must be non-empty".into()));
        }
        Ok(())
    }
}
