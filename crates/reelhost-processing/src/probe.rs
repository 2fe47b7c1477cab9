//! Aspect ratio probing via `ffprobe`.

use crate::error::{validate_tool_path, ProcessingError, ProcessingResult};
use crate::traits::VideoProber;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

const TOOL: &str = "ffprobe";

/// Orientation bucket derived from a stream's display aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    Other,
}

impl AspectRatio {
    pub fn classify(display_aspect_ratio: &str) -> Self {
        match display_aspect_ratio.trim() {
            "16:9" => AspectRatio::Landscape,
            "9:16" => AspectRatio::Portrait,
            _ => AspectRatio::Other,
        }
    }

    /// `"16:9"`, `"9:16"` or `"other"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Other => "other",
        }
    }

    /// Storage key prefix for videos in this bucket.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Other => "other",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Raw value reported by the tool, empty when absent.
    pub display_aspect_ratio: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    display_aspect_ratio: Option<String>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// Uses the first video stream, falling back to the first stream of any kind when
/// no stream declares `codec_type`.
pub fn parse_probe_output(stdout: &[u8]) -> ProcessingResult<ProbeResult> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .or_else(|| output.streams.first())
        .ok_or(ProcessingError::NoStreams)?;

    let display_aspect_ratio = stream.display_aspect_ratio.clone().unwrap_or_default();
    Ok(ProbeResult {
        aspect_ratio: AspectRatio::classify(&display_aspect_ratio),
        display_aspect_ratio,
    })
}

/// [`VideoProber`] backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> ProcessingResult<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_tool_path(TOOL, &ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl VideoProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessingError::Spawn { tool: TOOL, source })?;

        if !output.status.success() {
            return Err(ProcessingError::ToolFailed {
                tool: TOOL,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let result = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            display_aspect_ratio = %result.display_aspect_ratio,
            aspect_ratio = %result.aspect_ratio,
            "Video probe completed"
        );

        Ok(result)
    }
}
