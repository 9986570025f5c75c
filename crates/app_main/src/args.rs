use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixialbum")]
#[command(about = "Browse a PixiAlbum event gallery from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Event to open
    pub event: String,

    /// Pages to load after the first one
    #[arg(long, default_value = "0")]
    pub pages: u32,

    /// Viewport width in px, picks the column count
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Image ids to toggle the like state of
    #[arg(long = "like", value_name = "IMAGE_ID")]
    pub likes: Vec<String>,

    /// Show only liked images
    #[arg(long)]
    pub liked_only: bool,

    /// Overrides `api.base_url` from the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Overrides `storage.database_path` from the config file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Write the effective configuration, overrides included, to the config file
    #[arg(long)]
    pub write_config: bool,
}
