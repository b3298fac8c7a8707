use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use tubely_core::constants::ACCEPTED_VIDEO_CONTENT_TYPE;
use tubely_core::Video;
use tubely_db::VideoRepository;
use tubely_processing::{
    faststart_output_path, inspect_aspect, remux_faststart, BodyError, MediaTool, StagingArea,
    StagingError, StagingScope,
};
use tubely_storage::{derive_key, generate_token, playback_url, Storage};

use super::error::UploadError;
use super::types::{UploadRequest, UploadStage};
use crate::utils::upload::normalize_mime_type;

/// Drives one upload from an authenticated request to a persisted playback URL.
#[derive(Clone)]
pub struct UploadOrchestrator {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    media_tool: Arc<dyn MediaTool>,
    staging: StagingArea,
    distribution_domain: String,
}

impl UploadOrchestrator {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        media_tool: Arc<dyn MediaTool>,
        staging: StagingArea,
        distribution_domain: impl Into<String>,
    ) -> Self {
        Self {
            videos,
            storage,
            media_tool,
            staging,
            distribution_domain: distribution_domain.into(),
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Run the pipeline and return the updated record.
    ///
    /// Staged files are released before this returns, whatever the outcome.
    /// If the future is dropped mid-flight the scope's `Drop` removes them
    /// instead.
    #[tracing::instrument(skip_all, fields(video_id = %request.video_id, user_id = %request.user_id))]
    pub async fn process<S>(&self, request: UploadRequest<S>) -> Result<Video, UploadError>
    where
        S: Stream<Item = Result<Bytes, BodyError>> + Send,
    {
        let started = Instant::now();
        let mut scope = self.staging.scope();
        let mut stage = UploadStage::Received;

        let result = self.run(&mut scope, &mut stage, request).await;
        scope.release_all().await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(video) => {
                tracing::info!(
                    duration_ms,
                    video_url = video.video_url.as_deref().unwrap_or_default(),
                    "Video upload completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    duration_ms,
                    last_stage = %stage,
                    error = %e,
                    "Video upload failed"
                );
            }
        }

        result
    }

    async fn run<S>(
        &self,
        scope: &mut StagingScope,
        stage: &mut UploadStage,
        request: UploadRequest<S>,
    ) -> Result<Video, UploadError>
    where
        S: Stream<Item = Result<Bytes, BodyError>> + Send,
    {
        let UploadRequest {
            video_id,
            user_id,
            content_type,
            body,
        } = request;

        let mut video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(UploadError::MetadataLookupFailure)?
            .ok_or(UploadError::NotFound(video_id))?;
        if !video.is_owned_by(user_id) {
            return Err(UploadError::NotAuthorized { video_id, user_id });
        }
        *stage = UploadStage::Authorized;

        let content_type = accepted_content_type(content_type.as_deref())?;
        let staged = scope.stage(body).await?;
        tracing::debug!(size_bytes = staged.len(), "Upload staged");
        *stage = UploadStage::Staged;

        let aspect = inspect_aspect(self.media_tool.as_ref(), staged.path()).await?;
        tracing::debug!(aspect = %aspect, "Upload inspected");
        *stage = UploadStage::Inspected;

        // Owned by the scope before ffmpeg creates it.
        scope.adopt(faststart_output_path(staged.path()));
        let remuxed = remux_faststart(self.media_tool.as_ref(), staged.path()).await?;
        let staged = scope.replace(staged, remuxed).await?;
        tracing::debug!(size_bytes = staged.len(), "Upload remuxed for fast start");
        *stage = UploadStage::Remuxed;

        let token = generate_token().map_err(UploadError::KeyGenerationFailure)?;
        let key = derive_key(aspect, &token);
        tracing::debug!(storage_key = %key, "Storage key derived");
        *stage = UploadStage::KeyDerived;

        let reader = staged
            .reader()
            .await
            .map_err(|e| UploadError::Staging(StagingError::Reopen(e)))?;
        let uploaded = self
            .storage
            .upload_stream(
                key.as_str(),
                content_type,
                Some(staged.len()),
                Box::pin(reader),
            )
            .await
            .map_err(UploadError::StorageUploadFailure)?;
        tracing::info!(storage_key = %key, size_bytes = uploaded, "Video stored");
        *stage = UploadStage::Uploaded;
        scope.release(staged).await;

        let video_url = playback_url(&self.distribution_domain, &key);
        let updated_at = Utc::now();
        if let Err(e) = self
            .videos
            .update_video_url(video_id, &video_url, updated_at)
            .await
        {
            // No compensating delete: the object stays in the bucket.
            tracing::error!(
                orphaned_key = %key,
                error = %e,
                "Video stored but record update failed"
            );
            return Err(UploadError::MetadataPersistFailure(e));
        }
        video.video_url = Some(video_url);
        video.updated_at = updated_at;
        *stage = UploadStage::Persisted;
        tracing::debug!("Video record updated");

        *stage = UploadStage::Done;
        Ok(video)
    }
}

/// Check the declared media type and return the canonical one to store with.
fn accepted_content_type(declared: Option<&str>) -> Result<&'static str, UploadError> {
    let declared = declared
        .map(normalize_mime_type)
        .filter(|mime| !mime.is_empty())
        .ok_or(UploadError::MissingContentType)?;

    if declared != ACCEPTED_VIDEO_CONTENT_TYPE {
        return Err(UploadError::UnsupportedMediaType(declared));
    }

    Ok(ACCEPTED_VIDEO_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_content_type() {
        assert_eq!(accepted_content_type(Some("video/mp4")).unwrap(), "video/mp4");
        assert_eq!(
            accepted_content_type(Some("Video/MP4; codecs=\"avc1\"")).unwrap(),
            "video/mp4"
        );
    }

    #[test]
    fn test_rejected_content_types() {
        assert!(matches!(
            accepted_content_type(None),
            Err(UploadError::MissingContentType)
        ));
        assert!(matches!(
            accepted_content_type(Some("  ")),
            Err(UploadError::MissingContentType)
        ));
        match accepted_content_type(Some("video/quicktime")) {
            Err(UploadError::UnsupportedMediaType(mime)) => assert_eq!(mime, "video/quicktime"),
            other => panic!("Expected UnsupportedMediaType, got {:?}", other),
        }
    }
}
