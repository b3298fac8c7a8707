//! Media tool capability.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;

/// Stream list as reported by a probe (`ffprobe -show_streams` JSON shape).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

impl StreamInfo {
    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }
}

/// External media tooling used by the upload pipeline.
///
/// Implementations must be safe to call from many requests at once.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Read-only inspection of the file at `path`.
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ToolError>;

    /// Rewrite `input` into `output` with playback metadata at the front,
    /// copying audio and video streams verbatim.
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}
