//! Fast-start remux.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tubely_core::constants::FASTSTART_SUFFIX;

use crate::error::ProcessingError;
use crate::tool::MediaTool;

/// Output path for the fast-start copy of `input`: `<input>.faststart.mp4`.
pub fn faststart_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(FASTSTART_SUFFIX);
    PathBuf::from(name)
}

/// Remux `input` into a new fast-start file and return its path.
///
/// The input is left untouched. On failure any partial output is removed
/// before the error is returned. Swapping the output into the input's place
/// is the caller's job.
pub async fn remux_faststart(
    tool: &dyn MediaTool,
    input: &Path,
) -> Result<PathBuf, ProcessingError> {
    let output = faststart_output_path(input);

    if let Err(e) = tool.remux_faststart(input, &output).await {
        tracing::error!(
            error = %e,
            stderr = e.stderr().unwrap_or_default(),
            input = %input.display(),
            "Fast-start remux failed"
        );
        match tokio::fs::remove_file(&output).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = %err, path = %output.display(), "Failed to remove partial remux output");
            }
        }
        return Err(ProcessingError::RemuxFailure(e));
    }

    Ok(output)
}
