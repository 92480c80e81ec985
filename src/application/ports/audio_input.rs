//! Audio input port interface

use crate::domain::error::RecorderError;

/// What the default input device reports before capture starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceInfo {
    pub name: String,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Receives interleaved 16-bit chunks on the audio driver's thread
pub type ChunkSink = Box<dyn FnMut(&[i16]) + Send + 'static>;

/// Receives stream errors on the audio driver's thread
pub type ErrorSink = Box<dyn FnMut(String) + Send + 'static>;

/// A live input stream. Capture stops when the handle is dropped.
pub trait CaptureStream {}

/// Port for the microphone.
///
/// Streams are not required to be `Send`; the recorder opens, polls and
/// drops a stream on one thread.
pub trait AudioInput: Send + Sync {
    /// Query the default input device
    fn default_device(&self) -> Result<InputDeviceInfo, RecorderError>;

    /// Start streaming from `device`, delivering every chunk to `on_chunk`
    fn open_stream(
        &self,
        device: &InputDeviceInfo,
        on_chunk: ChunkSink,
        on_error: ErrorSink,
    ) -> Result<Box<dyn CaptureStream>, RecorderError>;
}
