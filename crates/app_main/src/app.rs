//! One gallery session driven from the command line

use crate::args::Cli;
use anyhow::{Context, Result};
use app_core::{AppConfig, EventId, GallerySession, GalleryView, ImageId, ViewMode};
use feed_api::HttpFeedClient;
use std::sync::Arc;

pub async fn run(config: AppConfig, cli: Cli) -> Result<()> {
    let client = HttpFeedClient::new(
        &config.api.base_url,
        config.api.request_timeout(),
        config.api.session_token.clone(),
    )?;
    let store = app_db::init(config.storage.database_path.as_deref()).context("Failed to open client store")?;

    let session = GallerySession::new(config, Arc::new(client), Arc::new(store))?;
    session.set_viewport_width(cli.width);

    if let Err(e) = session.open_event(EventId::from(cli.event.as_str())).await {
        tracing::warn!("First page failed: {}", e);
    }
    for _ in 0..cli.pages {
        if session.view().exhausted {
            break;
        }
        if let Err(e) = session.request_next_page().await {
            tracing::warn!("Page request failed: {}", e);
            break;
        }
    }

    for id in cli.likes {
        let id = ImageId::from(id.as_str());
        let liked = session.toggle_like(id.clone()).await?;
        tracing::info!("{} is now {}", id, if liked { "liked" } else { "not liked" });
    }

    if cli.liked_only {
        if let Err(e) = session.set_mode(ViewMode::LikedOnly).await {
            tracing::warn!("Liked view failed: {}", e);
        }
    }

    print_view(&session.view());
    let stats = session.cache().stats();
    tracing::debug!(entries = stats.entries, bytes = stats.bytes, "Decode cache");
    Ok(())
}

fn print_view(view: &GalleryView) {
    println!("{}", view.title);
    if let Some(message) = &view.error_message {
        println!("! {}", message);
    }
    println!(
        "{} images fetched, showing {}..{}{}",
        view.item_count,
        view.window.start(),
        view.window.end(),
        if view.exhausted { " (end of feed)" } else { "" }
    );

    for (i, column) in view.columns.columns().iter().enumerate() {
        println!("-- column {} --", i + 1);
        for item in column {
            let mark = if view.liked.contains(&item.id) { "*" } else { " " };
            println!("{} {}  {}", mark, item.id, item.display_name);
        }
    }
}
