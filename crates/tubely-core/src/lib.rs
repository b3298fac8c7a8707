//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the storage, processing, database and API crates.

pub mod aspect;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use aspect::AspectClass;
pub use config::{BaseConfig, Config, MediaToolConfig, TubelyConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Video, VideoResponse};
pub use storage_types::StorageBackend;
