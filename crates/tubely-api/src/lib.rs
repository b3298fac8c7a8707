//! Tubely API
//!
//! HTTP surface of the video ingestion service. The single write endpoint
//! accepts a multipart MP4 for an existing video record, runs it through the
//! upload pipeline in [`services::upload`] and returns the updated record.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
