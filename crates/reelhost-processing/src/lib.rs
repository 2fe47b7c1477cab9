//! Reelhost Processing Library
//!
//! Wrappers around the external media tools used by the upload pipeline:
//! `ffprobe` to classify a video's display aspect ratio and `ffmpeg` to move the
//! MP4 index to the front of the file. Both sit behind small traits so callers
//! can substitute deterministic fakes.

pub mod cleanup;
pub mod error;
pub mod faststart;
pub mod probe;
pub mod traits;

#[cfg(all(test, unix))]
mod test_support;

pub use cleanup::ScopedFile;
pub use error::{ProcessingError, ProcessingResult};
pub use faststart::FfmpegFastStart;
pub use probe::{AspectRatio, FfprobeProber, ProbeResult};
pub use traits::{VideoProber, VideoTranscoder};
