//! Recording infrastructure module
//!
//! Microphone capture through cpal and 16-bit PCM WAV files through hound.

mod cpal_input;
mod wav_store;

pub use cpal_input::CpalInput;
pub use wav_store::WavStore;
