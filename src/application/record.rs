//! Bounded recording use case

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration as StdDuration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::error::RecorderError;
use crate::domain::recording::{RecordingLimits, RecordingStats, SilenceSettings};
use crate::domain::transcription::Language;

use super::capture::{ChunkProcessor, StopCause, StopSignal, WriterSlot};
use super::ports::{AudioInput, InputDeviceInfo, PcmFormat, RecordingStore, Transcriber};

/// How often the controller checks the flag and the wall-clock ceiling
pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_millis(200);

/// Options for a recorder instance
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// Destination file, overwritten on every run
    pub output: PathBuf,
    pub language: Language,
    pub limits: RecordingLimits,
    pub silence: SilenceSettings,
    pub poll_interval: StdDuration,
}

impl RecorderOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            language: Language::default(),
            limits: RecordingLimits::default(),
            silence: SilenceSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A finalized file that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecording {
    pub path: PathBuf,
    pub stats: RecordingStats,
    pub stop_cause: StopCause,
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct RecordCallbacks {
    /// Called once the input stream is open
    pub on_recording_start: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called after the file is finalized and validated
    pub on_recording_end: Option<Box<dyn Fn(&CapturedRecording) + Send + Sync>>,
    /// Called when the transcription request is sent
    pub on_transcribing_start: Option<Box<dyn Fn() + Send + Sync>>,
}

/// Records one utterance from the default microphone, validates it and
/// hands it to the transcriber.
pub struct BoundedRecorder<A, S, T>
where
    A: AudioInput + 'static,
    S: RecordingStore + 'static,
    T: Transcriber + 'static,
{
    input: Arc<A>,
    store: Arc<S>,
    transcriber: Arc<T>,
    options: Arc<RecorderOptions>,
    is_recording: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
}

impl<A, S, T> Clone for BoundedRecorder<A, S, T>
where
    A: AudioInput + 'static,
    S: RecordingStore + 'static,
    T: Transcriber + 'static,
{
    fn clone(&self) -> Self {
        Self {
            input: Arc::clone(&self.input),
            store: Arc::clone(&self.store),
            transcriber: Arc::clone(&self.transcriber),
            options: Arc::clone(&self.options),
            is_recording: Arc::clone(&self.is_recording),
            busy: Arc::clone(&self.busy),
        }
    }
}

impl<A, S, T> BoundedRecorder<A, S, T>
where
    A: AudioInput + 'static,
    S: RecordingStore + 'static,
    T: Transcriber + 'static,
{
    pub fn new(input: A, store: S, transcriber: T, options: RecorderOptions) -> Self {
        Self {
            input: Arc::new(input),
            store: Arc::new(store),
            transcriber: Arc::new(transcriber),
            options: Arc::new(options),
            is_recording: Arc::new(AtomicBool::new(false)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True from the start of a capture until it stops
    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    /// Get the recording flag for external signal handling
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.is_recording)
    }

    /// End capture; the file is finalized and processed normally.
    /// Idempotent, and a no-op when nothing is recording.
    pub fn stop(&self) {
        if self.is_recording.swap(false, Ordering::SeqCst) {
            info!("stop requested");
        }
    }

    /// Start a recording in the background and deliver exactly one outcome
    /// to `on_done`. The callback runs on a runtime task, never on the
    /// audio thread.
    pub fn record<F>(&self, callbacks: RecordCallbacks, on_done: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<String, RecorderError>) + Send + 'static,
    {
        let recorder = self.clone();
        tokio::spawn(async move {
            let outcome = recorder.record_outcome(&callbacks).await;
            if let Err(ref e) = outcome {
                warn!(kind = ?e.kind(), "{}", e.user_message());
            }
            on_done(outcome);
        })
    }

    /// Capture, validate and transcribe, returning the trimmed transcript
    pub async fn record_outcome(
        &self,
        callbacks: &RecordCallbacks,
    ) -> Result<String, RecorderError> {
        let recording = self.capture(callbacks).await?;

        if let Some(ref cb) = callbacks.on_recording_end {
            cb(&recording);
        }
        if let Some(ref cb) = callbacks.on_transcribing_start {
            cb();
        }

        self.transcribe(&recording).await
    }

    /// Capture until silence, `stop()` or the ceiling, then finalize and
    /// validate the file.
    pub async fn capture(
        &self,
        callbacks: &RecordCallbacks,
    ) -> Result<CapturedRecording, RecorderError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RecorderError::Other("Įrašymas jau vyksta".to_string()));
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let input = Arc::clone(&self.input);
        let store = Arc::clone(&self.store);
        let options = Arc::clone(&self.options);
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();

        // Raised before the device is queried so an early stop() is kept
        let signal = StopSignal::new(Arc::clone(&self.is_recording));
        signal.resume();

        let session = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let result = run_session(
                input.as_ref(),
                store.as_ref(),
                &options,
                signal.clone(),
                started_tx,
            );
            signal.clear();
            result
        });

        if started_rx.await.is_ok() {
            if let Some(ref cb) = callbacks.on_recording_start {
                cb();
            }
        }

        session
            .await
            .map_err(|e| RecorderError::Other(format!("Įrašymo užduotis nutrūko: {}", e)))?
    }

    /// Send a validated recording to the transcriber
    pub async fn transcribe(&self, recording: &CapturedRecording) -> Result<String, RecorderError> {
        debug!(path = %recording.path.display(), language = %self.options.language, "transcribing");
        let text = self
            .transcriber
            .transcribe(&recording.path, self.options.language)
            .await?;
        let text = text.trim().to_string();
        info!(chars = text.chars().count(), "transcription finished");
        Ok(text)
    }
}

/// Releases the single-capture slot when the session thread ends
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One capture session, run on a blocking thread because input streams
/// need not be `Send`.
fn run_session<A, S>(
    input: &A,
    store: &S,
    options: &RecorderOptions,
    signal: StopSignal,
    started: tokio::sync::oneshot::Sender<()>,
) -> Result<CapturedRecording, RecorderError>
where
    A: AudioInput + ?Sized,
    S: RecordingStore + ?Sized,
{
    let device = input.default_device()?;
    if device.channels < 1 {
        return Err(RecorderError::DeviceError(format!(
            "įrenginys \"{}\" neturi įvesties kanalų",
            device.name
        )));
    }

    info!(
        device = %device.name,
        channels = device.channels,
        sample_rate = device.sample_rate,
        path = %options.output.display(),
        "starting capture"
    );

    let format = PcmFormat {
        channels: device.channels,
        sample_rate: device.sample_rate,
    };
    let writer: WriterSlot = Arc::new(Mutex::new(Some(store.create(&options.output, format)?)));

    if signal.is_recording() {
        if let Err(e) = stream_until_stopped(input, &device, &writer, options, &signal, started) {
            signal.stop(StopCause::StreamError(e.to_string()));
            let _ = finalize(&writer);
            return Err(e);
        }
    } else {
        info!("stop requested before the stream opened");
    }

    let cause = signal.cause().cloned().unwrap_or(StopCause::External);
    debug!(cause = ?cause, "capture stopped");

    finalize(&writer)?;

    if let Some(err) = stop_error(&cause, options) {
        return Err(err);
    }

    let stats = store.inspect(&options.output)?;
    info!(
        frames = stats.frames,
        duration_ms = stats.duration().as_millis() as u64,
        size_bytes = stats.size_bytes,
        "recording finalized"
    );
    options.limits.validate(&stats)?;

    Ok(CapturedRecording {
        path: options.output.clone(),
        stats,
        stop_cause: cause,
    })
}

/// Open the stream and poll until something clears the flag. The stream is
/// dropped before returning.
fn stream_until_stopped<A>(
    input: &A,
    device: &InputDeviceInfo,
    writer: &WriterSlot,
    options: &RecorderOptions,
    signal: &StopSignal,
    started: tokio::sync::oneshot::Sender<()>,
) -> Result<(), RecorderError>
where
    A: AudioInput + ?Sized,
{
    let mut processor = ChunkProcessor::new(
        Arc::clone(writer),
        options.silence,
        device.channels,
        device.sample_rate,
        signal.clone(),
    );
    let error_signal = signal.clone();

    let stream = input.open_stream(
        device,
        Box::new(move |chunk| processor.process(chunk)),
        Box::new(move |message| {
            warn!(error = %message, "audio stream error");
            error_signal.stop(StopCause::StreamError(message));
        }),
    )?;
    let _ = started.send(());

    let ceiling = options.limits.max_duration.as_std();
    let started_at = Instant::now();
    while signal.is_recording() {
        std::thread::sleep(options.poll_interval);
        if started_at.elapsed() > ceiling {
            info!(max = %options.limits.max_duration, "maximum duration reached");
            signal.stop(StopCause::Ceiling);
        }
    }

    drop(stream);
    Ok(())
}

/// Error for stop causes that end the session without validation
fn stop_error(cause: &StopCause, options: &RecorderOptions) -> Option<RecorderError> {
    match cause {
        StopCause::Ceiling => Some(RecorderError::TooLong {
            recorded_secs: None,
            max: options.limits.max_duration,
        }),
        StopCause::StreamError(message) => Some(RecorderError::Other(format!(
            "Garso srauto klaida: {}",
            message
        ))),
        StopCause::WriteError(message) => Some(RecorderError::Other(format!(
            "Nepavyko įrašyti garso: {}",
            message
        ))),
        StopCause::Silence | StopCause::External => None,
    }
}

fn finalize(writer: &WriterSlot) -> Result<(), RecorderError> {
    let taken = writer
        .lock()
        .map_err(|_| RecorderError::Other("Įrašymo būsena sugadinta".to_string()))?
        .take();
    match taken {
        Some(writer) => writer.finalize(),
        None => Ok(()),
    }
}
