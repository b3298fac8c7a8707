use thiserror::Error;
use tubely_core::AppError;
use tubely_processing::{ProcessingError, StagingError, ToolError};
use tubely_storage::{KeyError, StorageError};
use uuid::Uuid;

/// Every way an upload can fail, one variant per pipeline outcome.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("User {user_id} does not own video {video_id}")]
    NotAuthorized { video_id: Uuid, user_id: Uuid },

    #[error("Missing multipart field '{0}'")]
    MissingVideoField(&'static str),

    #[error("Missing content type for video")]
    MissingContentType,

    #[error("Unsupported media type '{0}'")]
    UnsupportedMediaType(String),

    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Request body aborted: {0}")]
    BodyAborted(String),

    #[error("Staging failed: {0}")]
    Staging(#[source] StagingError),

    #[error("Probe failed: {0}")]
    ProbeFailure(#[source] ToolError),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Invalid video geometry {width}x{height}")]
    InvalidGeometry { width: i64, height: i64 },

    #[error("Fast-start remux failed: {0}")]
    RemuxFailure(#[source] ToolError),

    #[error("Failed to swap in remuxed file: {0}")]
    SwapFailure(#[source] std::io::Error),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailure(#[source] KeyError),

    #[error("Storage upload failed: {0}")]
    StorageUploadFailure(#[source] StorageError),

    #[error("Video lookup failed: {0}")]
    MetadataLookupFailure(#[source] AppError),

    #[error("Failed to persist video URL: {0}")]
    MetadataPersistFailure(#[source] AppError),
}

impl From<StagingError> for UploadError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::PayloadTooLarge { limit } => UploadError::PayloadTooLarge { limit },
            StagingError::BodyAborted(message) => UploadError::BodyAborted(message),
            StagingError::SwapFailure(e) => UploadError::SwapFailure(e),
            other => UploadError::Staging(other),
        }
    }
}

impl From<ProcessingError> for UploadError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::ProbeFailure(e) => UploadError::ProbeFailure(e),
            ProcessingError::NoVideoStream => UploadError::NoVideoStream,
            ProcessingError::InvalidGeometry { width, height } => {
                UploadError::InvalidGeometry { width, height }
            }
            ProcessingError::RemuxFailure(e) => UploadError::RemuxFailure(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        match err {
            UploadError::NotFound(_) => AppError::NotFound("Video not found".to_string()),
            UploadError::NotAuthorized { .. } => {
                AppError::Unauthorized("Not authorized to upload this video".to_string())
            }
            UploadError::MissingVideoField(_)
            | UploadError::MissingContentType
            | UploadError::UnsupportedMediaType(_)
            | UploadError::BodyAborted(_) => AppError::InvalidInput(message),
            UploadError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(message),
            UploadError::ProbeFailure(_)
            | UploadError::NoVideoStream
            | UploadError::InvalidGeometry { .. }
            | UploadError::RemuxFailure(_) => AppError::MediaProcessing(message),
            UploadError::StorageUploadFailure(_) => AppError::Storage(message),
            UploadError::MetadataLookupFailure(source) => source,
            UploadError::MetadataPersistFailure(source) => match source {
                db @ AppError::Database(_) => db,
                _ => AppError::Internal(message),
            },
            UploadError::Staging(_)
            | UploadError::SwapFailure(_)
            | UploadError::KeyGenerationFailure(_) => AppError::Internal(message),
        }
    }
}

impl From<UploadError> for crate::error::HttpAppError {
    fn from(err: UploadError) -> Self {
        crate::error::HttpAppError(err.into())
    }
}
