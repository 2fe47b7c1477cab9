//! Fast-start remuxing via `ffmpeg`.
//!
//! Streams are copied as-is into a new MP4 container with the `moov` atom moved
//! ahead of the media data, so playback can begin before the download finishes.

use crate::cleanup::ScopedFile;
use crate::error::{validate_tool_path, ProcessingError, ProcessingResult};
use crate::traits::VideoTranscoder;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const TOOL: &str = "ffmpeg";

/// Suffix appended to the input path to name the remuxed output.
pub const OUTPUT_SUFFIX: &str = ".processing";

/// Sibling path the remuxed file is written to.
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut name: OsString = input.as_os_str().to_owned();
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// [`VideoTranscoder`] backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegFastStart {
    ffmpeg_path: String,
}

impl FfmpegFastStart {
    pub fn new(ffmpeg_path: impl Into<String>) -> ProcessingResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_tool_path(TOOL, &ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl VideoTranscoder for FfmpegFastStart {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn transcode(&self, input: &Path) -> ProcessingResult<ScopedFile> {
        let start = std::time::Instant::now();
        let output_path = output_path_for(input);
        // Guard first so a partial file from a failed run is removed too.
        let output = ScopedFile::new(&output_path);

        let result = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-y", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "+faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdin(Stdio::null())
            // A cancelled request must not leave ffmpeg writing behind the guard
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessingError::Spawn { tool: TOOL, source })?;

        if !result.status.success() {
            return Err(ProcessingError::ToolFailed {
                tool: TOOL,
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        // ffmpeg can exit 0 without producing usable output
        let metadata = tokio::fs::metadata(&output_path)
            .await
            .map_err(|source| ProcessingError::MissingOutput {
                path: output_path.clone(),
                source,
            })?;
        if metadata.len() == 0 {
            return Err(ProcessingError::EmptyOutput(output_path));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            size_bytes = metadata.len(),
            "Fast-start remux completed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_is_sibling_with_suffix() {
        assert_eq!(
            output_path_for(Path::new("/tmp/reelhost-upload-abc.mp4")),
            PathBuf::from("/tmp/reelhost-upload-abc.mp4.processing")
        );
    }

    #[test]
    fn test_rejects_unsafe_tool_path() {
        assert!(FfmpegFastStart::new("ffmpeg|sh").is_err());
        assert!(FfmpegFastStart::new("/usr/bin/ffmpeg").is_ok());
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use crate::test_support::write_script;

        // Writes to its last argument, where ffmpeg takes the output path.
        const COPY_LAST_ARG: &str = r#"for last; do :; done
printf 'moov-first' > "$last""#;

        #[tokio::test]
        async fn test_transcode_produces_non_empty_output() {
            let dir = tempfile::tempdir().unwrap();
            let tool = write_script(dir.path(), "ffmpeg", COPY_LAST_ARG);
            let input = dir.path().join("in.mp4");
            std::fs::write(&input, b"mdat-first").unwrap();

            let transcoder = FfmpegFastStart::new(tool.to_string_lossy()).unwrap();
            let output = transcoder.transcode(&input).await.unwrap();

            assert_eq!(output.path(), output_path_for(&input).as_path());
            assert_eq!(std::fs::read(output.path()).unwrap(), b"moov-first");

            let path = output.path().to_path_buf();
            drop(output);
            assert!(!path.exists());
        }

        #[tokio::test]
        async fn test_empty_output_is_error_despite_success() {
            let dir = tempfile::tempdir().unwrap();
            let tool = write_script(
                dir.path(),
                "ffmpeg",
                "for last; do :; done\n: > \"$last\"\nexit 0",
            );
            let input = dir.path().join("in.mp4");
            std::fs::write(&input, b"data").unwrap();

            let transcoder = FfmpegFastStart::new(tool.to_string_lossy()).unwrap();
            let result = transcoder.transcode(&input).await;

            assert!(matches!(result, Err(ProcessingError::EmptyOutput(_))));
            assert!(!output_path_for(&input).exists());
        }

        #[tokio::test]
        async fn test_missing_output_is_error_despite_success() {
            let dir = tempfile::tempdir().unwrap();
            let tool = write_script(dir.path(), "ffmpeg", "exit 0");
            let input = dir.path().join("in.mp4");
            std::fs::write(&input, b"data").unwrap();

            let transcoder = FfmpegFastStart::new(tool.to_string_lossy()).unwrap();
            assert!(matches!(
                transcoder.transcode(&input).await,
                Err(ProcessingError::MissingOutput { .. })
            ));
        }

        #[tokio::test]
        async fn test_cancelled_transcode_leaves_no_output() {
            let dir = tempfile::tempdir().unwrap();
            let tool = write_script(
                dir.path(),
                "ffmpeg",
                "for last; do :; done\nsleep 0.5\nprintf 'late' > \"$last\"",
            );
            let input = dir.path().join("in.mp4");
            std::fs::write(&input, b"data").unwrap();

            let transcoder = FfmpegFastStart::new(tool.to_string_lossy()).unwrap();
            let result = tokio::time::timeout(
                std::time::Duration::from_millis(100),
                transcoder.transcode(&input),
            )
            .await;
            assert!(result.is_err());

            // Past the point where a surviving tool would have written its output
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            assert!(!output_path_for(&input).exists());
        }

        #[tokio::test]
        async fn test_failed_run_removes_partial_output() {
            let dir = tempfile::tempdir().unwrap();
            let tool = write_script(
                dir.path(),
                "ffmpeg",
                "for last; do :; done\nprintf 'partial' > \"$last\"\necho 'Invalid data found' >&2\nexit 1",
            );
            let input = dir.path().join("in.mp4");
            std::fs::write(&input, b"data").unwrap();

            let transcoder = FfmpegFastStart::new(tool.to_string_lossy()).unwrap();
            match transcoder.transcode(&input).await {
                Err(ProcessingError::ToolFailed { tool, stderr, .. }) => {
                    assert_eq!(tool, "ffmpeg");
                    assert!(stderr.contains("Invalid data found"));
                }
                other => panic!("expected ToolFailed, got {:?}", other),
            }
            assert!(!output_path_for(&input).exists());
        }
    }
}
