//! Storage key policy.
//!
//! Key format: `<orientation>/<token>.mp4`, where the token is 16 bytes from
//! the operating system CSPRNG rendered as 32 lowercase hex characters. Keys
//! are generated once per upload and never recomputed.

use std::fmt::{Display, Formatter, Result as FmtResult};

use rand::rngs::OsRng;
use rand::TryRngCore;
use thiserror::Error;
use tubely_core::constants::{KEY_TOKEN_BYTES, VIDEO_EXTENSION};
use tubely_core::AspectClass;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Failed to obtain random bytes: {0}")]
    RandomUnavailable(String),
}

/// A derived object key such as `landscape/0f3c...e1.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the key for an orientation and random token. Pure.
pub fn derive_key(orientation: AspectClass, token: &[u8; KEY_TOKEN_BYTES]) -> StorageKey {
    StorageKey(format!(
        "{}/{}.{}",
        orientation.prefix(),
        hex::encode(token),
        VIDEO_EXTENSION
    ))
}

/// Draw a fresh token from the OS CSPRNG.
///
/// There is no fallback to a weaker generator; failure is reported to the caller.
pub fn generate_token() -> Result<[u8; KEY_TOKEN_BYTES], KeyError> {
    let mut token = [0u8; KEY_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut token)
        .map_err(|e| KeyError::RandomUnavailable(e.to_string()))?;
    Ok(token)
}

/// Public playback URL for a stored object.
pub fn playback_url(distribution_domain: &str, key: &StorageKey) -> String {
    format!("https://{}/{}", distribution_domain, key)
}
