//! Video upload pipeline.
//!
//! One request walks `Received → Authorized → Staged → Inspected → Remuxed →
//! KeyDerived → Uploaded → Persisted → Done`. Every failure short-circuits to
//! a single `UploadError`; staged files are released on every exit path.

pub mod error;
pub mod orchestrator;
pub mod types;

pub use error::UploadError;
pub use orchestrator::UploadOrchestrator;
pub use types::{UploadRequest, UploadStage};
