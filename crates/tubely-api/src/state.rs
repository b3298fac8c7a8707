use crate::services::upload::UploadOrchestrator;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{MediaTool, StagingArea};
use tubely_storage::Storage;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub uploads: UploadOrchestrator,
}

impl AppState {
    /// Wire the upload pipeline around the given backends.
    pub fn new(
        config: &Config,
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        media_tool: Arc<dyn MediaTool>,
    ) -> Self {
        let staging = StagingArea::new(
            config.upload_temp_dir().to_path_buf(),
            config.max_video_size_bytes(),
        );
        let uploads = UploadOrchestrator::new(
            videos.clone(),
            storage.clone(),
            media_tool,
            staging,
            config.distribution_domain(),
        );

        Self {
            videos,
            storage,
            uploads,
        }
    }
}
