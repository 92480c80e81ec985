//! 16-bit PCM WAV files via hound

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use tracing::{debug, warn};

use crate::application::ports::{FrameWriter, PcmFormat, RecordingStore};
use crate::domain::error::RecorderError;
use crate::domain::recording::RecordingStats;

/// Writes recordings as little-endian 16-bit WAV
#[derive(Debug, Default, Clone)]
pub struct WavStore;

impl WavStore {
    pub fn new() -> Self {
        Self
    }
}

struct WavFrameWriter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
}

impl FrameWriter for WavFrameWriter {
    fn write_samples(&mut self, samples: &[i16]) -> Result<(), RecorderError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| RecorderError::Other(format!("Nepavyko įrašyti WAV: {}", e)))?;
        }
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<(), RecorderError> {
        match self.writer.take() {
            Some(writer) => writer
                .finalize()
                .map_err(|e| RecorderError::Other(format!("Nepavyko užbaigti WAV: {}", e))),
            None => Ok(()),
        }
    }
}

impl Drop for WavFrameWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}

impl RecordingStore for WavStore {
    fn create(&self, path: &Path, format: PcmFormat) -> Result<Box<dyn FrameWriter>, RecorderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                RecorderError::Other(format!("Nepavyko sukurti katalogo {}: {}", parent.display(), e))
            })?;
        }

        let spec = hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, spec).map_err(|e| {
            RecorderError::Other(format!("Nepavyko sukurti failo {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), ?spec, "created WAV file");

        Ok(Box::new(WavFrameWriter {
            writer: Some(writer),
        }))
    }

    fn inspect(&self, path: &Path) -> Result<RecordingStats, RecorderError> {
        let reader = hound::WavReader::open(path).map_err(|e| {
            RecorderError::Other(format!("Nepavyko atidaryti failo {}: {}", path.display(), e))
        })?;
        let spec = reader.spec();
        let size_bytes = fs::metadata(path)
            .map_err(|e| RecorderError::Other(format!("Nepavyko nuskaityti failo dydžio: {}", e)))?
            .len();

        Ok(RecordingStats {
            frames: reader.duration(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            size_bytes,
        })
    }
}
