use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{UploadError, UploadRequest};
use crate::state::AppState;
use crate::utils::upload::{body_error, multipart_error};
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::{AppError, VideoResponse};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "ID of the video record to attach the upload to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "MP4 file in a part named 'video'"),
    responses(
        (status = 200, description = "Video uploaded and record updated", body = VideoResponse),
        (status = 400, description = "Invalid video ID, missing file or unsupported media type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token, or caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing, storage or database failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))?;

    // Parts before the file are skipped unread; the file part streams straight
    // into the pipeline.
    loop {
        let Some(field) = multipart.next_field().await.map_err(multipart_error)? else {
            return Err(UploadError::MissingVideoField(VIDEO_FORM_FIELD).into());
        };
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let request = UploadRequest {
            video_id,
            user_id: user.user_id,
            content_type: field.content_type().map(String::from),
            body: field.map_err(body_error),
        };
        let video = state.uploads.process(request).await?;

        return Ok(Json(video.into()));
    }
}
