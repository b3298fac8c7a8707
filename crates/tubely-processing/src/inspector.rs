//! Aspect-ratio inspection.
//!
//! A video is `landscape` when `width / height` is strictly within
//! [`ASPECT_TOLERANCE`] of 16/9, `portrait` when strictly within it of 9/16,
//! and `other` otherwise. `other` is a normal outcome, not an error.

use std::path::Path;

use tubely_core::AspectClass;

use crate::error::ProcessingError;
use crate::tool::MediaTool;

/// Absolute tolerance on `width / height`. 1920x1080 and 1080x1920 fall well
/// inside it; 4:3 and square videos do not.
pub const ASPECT_TOLERANCE: f64 = 0.02;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Classify a positive geometry.
pub fn classify(width: i64, height: i64) -> AspectClass {
    classify_ratio(width as f64 / height as f64)
}

fn classify_ratio(ratio: f64) -> AspectClass {
    if (ratio - LANDSCAPE_RATIO).abs() < ASPECT_TOLERANCE {
        AspectClass::Landscape
    } else if (ratio - PORTRAIT_RATIO).abs() < ASPECT_TOLERANCE {
        AspectClass::Portrait
    } else {
        AspectClass::Other
    }
}

/// Probe `path` and classify its first video stream.
#[tracing::instrument(skip(tool))]
pub async fn inspect_aspect(
    tool: &dyn MediaTool,
    path: &Path,
) -> Result<AspectClass, ProcessingError> {
    let probe = tool
        .probe(path)
        .await
        .map_err(ProcessingError::ProbeFailure)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.is_video())
        .ok_or(ProcessingError::NoVideoStream)?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width <= 0 || height <= 0 {
        return Err(ProcessingError::InvalidGeometry { width, height });
    }

    let class = classify(width, height);
    tracing::debug!(width, height, aspect = %class, "Video aspect classified");
    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tool::{ProbeOutput, StreamInfo};
    use async_trait::async_trait;

    struct FixedProbe(Result<Vec<StreamInfo>, ()>);

    #[async_trait]
    impl MediaTool for FixedProbe {
        async fn probe(&self, _path: &Path) -> Result<ProbeOutput, ToolError> {
            match &self.0 {
                Ok(streams) => Ok(ProbeOutput {
                    streams: streams.clone(),
                }),
                Err(()) => Err(ToolError::Exit {
                    tool: "ffprobe",
                    status: "exit status: 1".to_string(),
                    stderr: "Invalid data found when processing input".to_string(),
                }),
            }
        }

        async fn remux_faststart(&self, _input: &Path, _output: &Path) -> Result<(), ToolError> {
            unreachable!("inspection never remuxes")
        }
    }

    fn video(width: i64, height: i64) -> StreamInfo {
        StreamInfo {
            codec_type: Some("video".to_string()),
            width: Some(width),
            height: Some(height),
        }
    }

    fn audio() -> StreamInfo {
        StreamInfo {
            codec_type: Some("audio".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_common_resolutions() {
        assert_eq!(classify(1920, 1080), AspectClass::Landscape);
        assert_eq!(classify(1280, 720), AspectClass::Landscape);
        assert_eq!(classify(854, 480), AspectClass::Landscape);
        assert_eq!(classify(1080, 1920), AspectClass::Portrait);
        assert_eq!(classify(720, 1280), AspectClass::Portrait);
        assert_eq!(classify(640, 480), AspectClass::Other);
        assert_eq!(classify(1000, 1000), AspectClass::Other);
    }

    #[test]
    fn test_landscape_tolerance_boundary() {
        // 1.795 is 0.0172 from 16/9; 1.8 is 0.0222 away.
        assert_eq!(classify(1795, 1000), AspectClass::Landscape);
        assert_eq!(classify(1800, 1000), AspectClass::Other);
        assert_eq!(classify_ratio(LANDSCAPE_RATIO + 0.019), AspectClass::Landscape);
        assert_eq!(classify_ratio(LANDSCAPE_RATIO - 0.019), AspectClass::Landscape);
        assert_eq!(classify_ratio(LANDSCAPE_RATIO + 0.021), AspectClass::Other);
        assert_eq!(classify_ratio(LANDSCAPE_RATIO - 0.021), AspectClass::Other);
    }

    #[test]
    fn test_portrait_tolerance_boundary() {
        assert_eq!(classify_ratio(PORTRAIT_RATIO + 0.019), AspectClass::Portrait);
        assert_eq!(classify_ratio(PORTRAIT_RATIO - 0.019), AspectClass::Portrait);
        assert_eq!(classify_ratio(PORTRAIT_RATIO + 0.021), AspectClass::Other);
        assert_eq!(classify_ratio(PORTRAIT_RATIO - 0.021), AspectClass::Other);
    }

    #[tokio::test]
    async fn test_uses_first_video_stream() {
        let tool = FixedProbe(Ok(vec![audio(), video(1080, 1920), video(1920, 1080)]));
        let class = inspect_aspect(&tool, Path::new("a.mp4")).await.unwrap();
        assert_eq!(class, AspectClass::Portrait);
    }

    #[tokio::test]
    async fn test_no_video_stream() {
        let tool = FixedProbe(Ok(vec![audio()]));
        let err = inspect_aspect(&tool, Path::new("a.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::NoVideoStream));
    }

    #[tokio::test]
    async fn test_invalid_geometry() {
        let tool = FixedProbe(Ok(vec![video(1920, 0)]));
        let err = inspect_aspect(&tool, Path::new("a.mp4")).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::InvalidGeometry {
                width: 1920,
                height: 0
            }
        ));

        let tool = FixedProbe(Ok(vec![StreamInfo {
            codec_type: Some("video".to_string()),
            ..Default::default()
        }]));
        let err = inspect_aspect(&tool, Path::new("a.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidGeometry { .. }));
    }

    #[tokio::test]
    async fn test_probe_failure_keeps_diagnostics() {
        let tool = FixedProbe(Err(()));
        let err = inspect_aspect(&tool, Path::new("a.mp4")).await.unwrap_err();
        match err {
            ProcessingError::ProbeFailure(tool_err) => {
                assert_eq!(
                    tool_err.stderr(),
                    Some("Invalid data found when processing input")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
