//! Recording storage port interface

use std::path::Path;

use crate::domain::error::RecorderError;
use crate::domain::recording::RecordingStats;

/// Layout of the 16-bit PCM container being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

/// Append-only sink for one recording
pub trait FrameWriter: Send {
    /// Append interleaved samples
    fn write_samples(&mut self, samples: &[i16]) -> Result<(), RecorderError>;

    /// Flush and patch the container header
    fn finalize(self: Box<Self>) -> Result<(), RecorderError>;
}

/// Port for creating and inspecting recordings on disk
pub trait RecordingStore: Send + Sync {
    /// Create (or truncate) the file at `path`
    fn create(&self, path: &Path, format: PcmFormat)
        -> Result<Box<dyn FrameWriter>, RecorderError>;

    /// Read back frame count, format and size of a finalized file
    fn inspect(&self, path: &Path) -> Result<RecordingStats, RecorderError>;
}
