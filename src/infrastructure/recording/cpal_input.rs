//! Microphone input using cpal
//!
//! Captures from the default input device at its native sample rate and
//! channel count. Every sample format is converted to interleaved i16
//! before it reaches the recorder.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use tracing::{debug, warn};

use crate::application::ports::{
    AudioInput, CaptureStream, ChunkSink, ErrorSink, InputDeviceInfo,
};
use crate::domain::error::RecorderError;

/// Audio input backed by the platform's default cpal host
#[derive(Debug, Default)]
pub struct CpalInput;

/// Keeps the cpal stream alive; dropping it stops the driver callbacks.
struct CpalStream {
    _stream: cpal::Stream,
}

impl CaptureStream for CpalStream {}

impl CpalInput {
    pub fn new() -> Self {
        Self
    }

    fn input_device() -> Result<cpal::Device, RecorderError> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| RecorderError::DeviceError("nerastas įvesties įrenginys".to_string()))
    }

    fn input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), RecorderError> {
        let supported = device
            .default_input_config()
            .map_err(|e| RecorderError::DeviceError(e.to_string()))?;
        let format = supported.sample_format();
        Ok((supported.config(), format))
    }

    fn device_name(device: &cpal::Device) -> String {
        device.name().unwrap_or_else(|_| "unknown".to_string())
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn u16_to_i16(sample: u16) -> i16 {
    (sample as i32 - 32768) as i16
}

impl AudioInput for CpalInput {
    fn default_device(&self) -> Result<InputDeviceInfo, RecorderError> {
        let device = Self::input_device()?;
        let (config, _) = Self::input_config(&device)?;
        Ok(InputDeviceInfo {
            name: Self::device_name(&device),
            channels: config.channels,
            sample_rate: config.sample_rate.0,
        })
    }

    fn open_stream(
        &self,
        info: &InputDeviceInfo,
        mut on_chunk: ChunkSink,
        mut on_error: ErrorSink,
    ) -> Result<Box<dyn CaptureStream>, RecorderError> {
        let device = Self::input_device()?;
        let (mut config, sample_format) = Self::input_config(&device)?;
        config.channels = info.channels;
        config.sample_rate = cpal::SampleRate(info.sample_rate);

        debug!(?sample_format, channels = config.channels, rate = config.sample_rate.0, "building input stream");

        let err_fn = move |err: cpal::StreamError| {
            warn!(error = %err, "cpal stream error");
            on_error(err.to_string());
        };

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| on_chunk(data),
                err_fn,
                None,
            ),
            SampleFormat::U16 => {
                let mut buffer = Vec::new();
                device.build_input_stream(
                    &config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        buffer.clear();
                        buffer.extend(data.iter().copied().map(u16_to_i16));
                        on_chunk(&buffer);
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::F32 => {
                let mut buffer = Vec::new();
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        buffer.clear();
                        buffer.extend(data.iter().copied().map(f32_to_i16));
                        on_chunk(&buffer);
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(RecorderError::DeviceError(format!(
                    "nepalaikomas mėginių formatas: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| RecorderError::DeviceError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| RecorderError::DeviceError(e.to_string()))?;

        Ok(Box::new(CpalStream { _stream: stream }))
    }
}
