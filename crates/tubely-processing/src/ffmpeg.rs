//! ffprobe/ffmpeg backed [`MediaTool`].

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tubely_core::MediaToolConfig;

use crate::error::ToolError;
use crate::tool::{MediaTool, ProbeOutput};

const FFPROBE: &str = "ffprobe";
const FFMPEG: &str = "ffmpeg";

#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffprobe_path: String,
    ffmpeg_path: String,
    timeout: Option<Duration>,
}

impl FfmpegTool {
    pub fn new(config: &MediaToolConfig) -> Self {
        Self {
            ffprobe_path: config.ffprobe_path.clone(),
            ffmpeg_path: config.ffmpeg_path.clone(),
            timeout: config.timeout,
        }
    }

    /// Run to completion and require a zero exit status.
    ///
    /// The child is killed if the returned future is dropped or the timeout fires.
    async fn run(&self, tool: &'static str, mut command: Command) -> Result<Output, ToolError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| ToolError::Timeout { tool, limit })?,
            None => command.output().await,
        }
        .map_err(|source| ToolError::Spawn { tool, source })?;

        if !output.status.success() {
            return Err(ToolError::Exit {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ToolError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path);

        let output = self.run(FFPROBE, command).await?;

        let probe: ProbeOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| ToolError::Parse {
                tool: FFPROBE,
                message: e.to_string(),
            })?;

        tracing::debug!(
            streams = probe.streams.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffprobe completed"
        );

        Ok(probe)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-movflags", "faststart", "-c:v", "copy", "-c:a", "copy"])
            .arg(output);

        self.run(FFMPEG, command).await?;

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffmpeg faststart remux completed"
        );

        Ok(())
    }
}
