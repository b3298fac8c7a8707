//! Tubely Storage Library
//!
//! Object-store abstraction for finished videos, with an S3 backend and a
//! local filesystem backend.
//!
//! # Storage key format
//!
//! Every uploaded video is stored under `<orientation>/<32-hex-token>.mp4`,
//! where orientation is one of `landscape`, `portrait` or `other`. Keys are
//! built exclusively by the `keys` module; the public playback URL is the
//! CDN distribution domain followed by the key.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{derive_key, generate_token, playback_url, KeyError, StorageKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
