//! Constants shared across the ingestion pipeline.

/// The only content type accepted by the upload endpoint.
pub const ACCEPTED_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// File extension of stored objects (without the dot).
pub const VIDEO_EXTENSION: &str = "mp4";

/// Multipart field carrying the uploaded file.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Default upload ceiling: 1 GiB.
pub const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 1024;

/// Default timeout applied to ffprobe/ffmpeg invocations.
pub const DEFAULT_MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;

/// Prefix of staged temp files. The random part and `.mp4` suffix are appended.
pub const STAGING_FILE_PREFIX: &str = "tubely-upload-";

/// Suffix appended to a staged path to name the fast-start remux output.
pub const FASTSTART_SUFFIX: &str = ".faststart.mp4";

/// Number of random bytes in a storage key token (32 hex characters).
pub const KEY_TOKEN_BYTES: usize = 16;
