//! Per-chunk capture pipeline
//!
//! Runs on the audio driver's thread. The only state shared with the
//! controlling thread is the stop signal and the writer slot, which the
//! controller touches only after the stream is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration as StdDuration;

use tracing::{debug, info, warn};

use crate::domain::recording::signal::{amplify, rms};
use crate::domain::recording::{SilenceSettings, SilenceTracker, SilenceVerdict};

use super::ports::FrameWriter;

/// Slot holding the writer until the controller finalizes it
pub type WriterSlot = Arc<Mutex<Option<Box<dyn FrameWriter>>>>;

/// Why capture ended. Only the first cause is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopCause {
    /// Trailing silence exceeded the hold time
    Silence,
    /// `stop()` was called
    External,
    /// Wall-clock time exceeded the maximum duration
    Ceiling,
    /// The audio driver reported an error
    StreamError(String),
    /// Writing a chunk failed
    WriteError(String),
}

/// The shared recording flag plus the first reason it was cleared.
#[derive(Debug, Clone)]
pub struct StopSignal {
    is_recording: Arc<AtomicBool>,
    cause: Arc<OnceLock<StopCause>>,
}

impl StopSignal {
    pub fn new(is_recording: Arc<AtomicBool>) -> Self {
        Self {
            is_recording,
            cause: Arc::new(OnceLock::new()),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    /// Raise the flag at the start of a session
    pub fn resume(&self) {
        self.is_recording.store(true, Ordering::SeqCst);
    }

    /// Clear the flag, keeping `cause` only if no earlier cause was set
    pub fn stop(&self, cause: StopCause) {
        let _ = self.cause.set(cause);
        self.is_recording.store(false, Ordering::SeqCst);
    }

    /// Lower the flag when a session ends, leaving the cause alone
    pub fn clear(&self) {
        self.is_recording.store(false, Ordering::SeqCst);
    }

    /// `None` if the flag was cleared from outside (or not at all)
    pub fn cause(&self) -> Option<&StopCause> {
        self.cause.get()
    }
}

/// Gain, write and silence-tracking for every incoming chunk.
pub struct ChunkProcessor {
    writer: WriterSlot,
    tracker: SilenceTracker,
    gain: f32,
    channels: u16,
    sample_rate: u32,
    frames_written: u64,
    scratch: Vec<i16>,
    signal: StopSignal,
}

impl ChunkProcessor {
    pub fn new(
        writer: WriterSlot,
        silence: SilenceSettings,
        channels: u16,
        sample_rate: u32,
        signal: StopSignal,
    ) -> Self {
        Self {
            writer,
            tracker: SilenceTracker::new(silence),
            gain: silence.gain,
            channels: channels.max(1),
            sample_rate,
            frames_written: 0,
            scratch: Vec::new(),
            signal,
        }
    }

    /// Stream position covered by the frames written so far
    pub fn position(&self) -> StdDuration {
        if self.sample_rate == 0 {
            return StdDuration::ZERO;
        }
        let nanos = self.frames_written as u128 * 1_000_000_000 / self.sample_rate as u128;
        StdDuration::from_nanos(nanos as u64)
    }

    /// Handle one chunk of interleaved samples.
    ///
    /// Chunks arriving after the flag is cleared are dropped, so nothing is
    /// written past a stop.
    pub fn process(&mut self, chunk: &[i16]) {
        if !self.signal.is_recording() {
            return;
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(chunk);
        amplify(&mut self.scratch, self.gain);

        if let Err(message) = self.write_scratch() {
            warn!(error = %message, "failed to write audio chunk");
            self.signal.stop(StopCause::WriteError(message));
            return;
        }

        self.frames_written += (self.scratch.len() / self.channels as usize) as u64;

        let level = rms(&self.scratch);
        if self.tracker.observe(level, self.position()) == SilenceVerdict::Stop {
            info!(position_ms = self.position().as_millis() as u64, "silence detected, stopping capture");
            self.signal.stop(StopCause::Silence);
        }
    }

    fn write_scratch(&mut self) -> Result<(), String> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| "writer lock poisoned".to_string())?;
        match guard.as_mut() {
            Some(writer) => writer
                .write_samples(&self.scratch)
                .map_err(|e| e.to_string()),
            None => {
                debug!("writer already taken, dropping chunk");
                Ok(())
            }
        }
    }
}
