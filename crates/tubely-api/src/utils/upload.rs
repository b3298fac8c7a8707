//! Common utilities for the upload handler

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use tubely_core::AppError;
use tubely_processing::BodyError;

/// Normalize a MIME type: drop parameters, trim, lowercase
/// (e.g. "Video/MP4; codecs=avc1" -> "video/mp4").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Map a failure while streaming the file part into the staging vocabulary.
pub fn body_error(err: MultipartError) -> BodyError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BodyError::TooLarge
    } else {
        BodyError::Aborted(err.body_text())
    }
}

/// Map a failure while reading multipart framing (before the file part).
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}
