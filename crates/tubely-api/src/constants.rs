//! API constants

/// API base path prefix
pub const API_BASE: &str = "/api";

/// Upload route, relative to [`API_BASE`].
pub const VIDEO_UPLOAD_PATH: &str = "/video_upload/{video_id}";

/// Headroom above the video ceiling for the multipart envelope (boundaries,
/// part headers, any small fields sent alongside the file).
pub const MULTIPART_ENVELOPE_BYTES: usize = 1024 * 1024;

/// Issuer stamped into access tokens by the auth service.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Upper bound on each readiness dependency check.
pub const READINESS_CHECK_TIMEOUT_SECS: u64 = 5;

/// Key probed by the storage readiness check. It is never written.
pub const HEALTH_CHECK_STORAGE_KEY: &str = "health-check-non-existent-key";
