//! Service initialization and application state setup

use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::PgVideoRepository;
use tubely_processing::FfmpegTool;
use tubely_storage::Storage;

/// Build repositories and the upload pipeline, returning the application state
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let temp_dir = config.upload_temp_dir();
    tokio::fs::create_dir_all(temp_dir)
        .await
        .with_context(|| format!("Failed to create upload temp dir {}", temp_dir.display()))?;

    let media_tools = config.media_tools();
    tracing::info!(
        ffprobe = %media_tools.ffprobe_path,
        ffmpeg = %media_tools.ffmpeg_path,
        timeout_secs = media_tools.timeout.map(|t| t.as_secs()),
        upload_temp_dir = %temp_dir.display(),
        "Media tools configured"
    );

    let videos = Arc::new(PgVideoRepository::new(pool));
    let media_tool = Arc::new(FfmpegTool::new(media_tools));

    Ok(Arc::new(AppState::new(
        config,
        videos,
        storage,
        media_tool,
    )))
}
