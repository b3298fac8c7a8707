//! Tubely Processing Library
//!
//! Everything the upload pipeline does to a video on local disk: spilling the
//! request body to a staged temp file, probing its geometry, and rewriting it
//! for fast-start playback. External tools are reached through the
//! [`MediaTool`] trait so tests can swap in deterministic fakes.

pub mod error;
pub mod ffmpeg;
pub mod inspector;
pub mod remux;
pub mod staging;
pub mod tool;

pub use error::{ProcessingError, StagingError, ToolError};
pub use ffmpeg::FfmpegTool;
pub use inspector::{classify, inspect_aspect, ASPECT_TOLERANCE};
pub use remux::{faststart_output_path, remux_faststart};
pub use staging::{BodyError, StagedFile, StagingArea, StagingScope};
pub use tool::{MediaTool, ProbeOutput, StreamInfo};
