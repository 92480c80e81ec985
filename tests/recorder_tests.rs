//! End-to-end recorder scenarios with a scripted microphone and real WAV files

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use memo_recorder::application::ports::{
    AudioInput, CaptureStream, ChunkSink, ErrorSink, InputDeviceInfo, RecordingStore, Transcriber,
    TranscriptionError,
};
use memo_recorder::application::{BoundedRecorder, RecordCallbacks, RecorderOptions, StopCause};
use memo_recorder::domain::error::{RecorderError, RecorderErrorKind};
use memo_recorder::domain::recording::Duration;
use memo_recorder::domain::transcription::Language;
use memo_recorder::infrastructure::WavStore;
use tempfile::TempDir;

const RATE: u32 = 16_000;
/// 100ms of mono audio
const CHUNK: usize = 1600;
/// Amplified to RMS 1000
const LOUD: i16 = 100;
/// Amplified to RMS 100
const QUIET: i16 = 10;

/// Microphone that replays `script` chunk by chunk on its own thread, then
/// repeats the last level until the stream is dropped.
struct ScriptedMic {
    channels: u16,
    script: Vec<i16>,
    pace: StdDuration,
    error_after: Option<usize>,
    open_delay: StdDuration,
}

impl ScriptedMic {
    fn new(script: Vec<i16>) -> Self {
        Self {
            channels: 1,
            script,
            pace: StdDuration::ZERO,
            error_after: None,
            open_delay: StdDuration::ZERO,
        }
    }

    fn paced(mut self, pace: StdDuration) -> Self {
        self.pace = pace;
        self
    }
}

struct ScriptedStream {
    alive: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CaptureStream for ScriptedStream {}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl AudioInput for ScriptedMic {
    fn default_device(&self) -> Result<InputDeviceInfo, RecorderError> {
        thread::sleep(self.open_delay);
        Ok(InputDeviceInfo {
            name: "scripted mic".to_string(),
            channels: self.channels,
            sample_rate: RATE,
        })
    }

    fn open_stream(
        &self,
        device: &InputDeviceInfo,
        mut on_chunk: ChunkSink,
        mut on_error: ErrorSink,
    ) -> Result<Box<dyn CaptureStream>, RecorderError> {
        let alive = Arc::new(AtomicBool::new(true));
        let thread_alive = Arc::clone(&alive);
        let script = self.script.clone();
        let pace = self.pace;
        let error_after = self.error_after;
        let samples_per_chunk = CHUNK * device.channels as usize;

        let handle = thread::Builder::new()
            .name("fake-audio".to_string())
            .spawn(move || {
                let mut i = 0;
                while thread_alive.load(Ordering::SeqCst) {
                    if error_after == Some(i) {
                        on_error("device unplugged".to_string());
                    }
                    let level = script[i.min(script.len() - 1)];
                    on_chunk(&vec![level; samples_per_chunk]);
                    i += 1;
                    if pace.is_zero() {
                        thread::yield_now();
                    } else {
                        thread::sleep(pace);
                    }
                }
            })
            .expect("spawn fake audio thread");

        Ok(Box::new(ScriptedStream {
            alive,
            handle: Some(handle),
        }))
    }
}

/// Transcriber that records what it was asked to transcribe
#[derive(Clone, Default)]
struct RecordingTranscriber {
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<(PathBuf, Language)>>>,
}

#[async_trait]
impl Transcriber for RecordingTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Language,
    ) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((audio_path.to_path_buf(), language));
        Ok(" Kepta duona su sūriu \n".to_string())
    }
}

struct FailingTranscriber;

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        _language: Language,
    ) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::RateLimited)
    }
}

fn options(dir: &TempDir) -> RecorderOptions {
    RecorderOptions {
        poll_interval: StdDuration::from_millis(5),
        ..RecorderOptions::new(dir.path().join("memo.wav"))
    }
}

fn speech_then_silence(speech_chunks: usize) -> Vec<i16> {
    let mut script = vec![LOUD; speech_chunks];
    script.push(QUIET);
    script
}

#[tokio::test]
async fn silence_only_stops_after_hold_and_is_too_short() {
    let dir = TempDir::new().unwrap();
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(vec![QUIET]),
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let err = recorder
        .record_outcome(&RecordCallbacks::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RecorderErrorKind::TooShort);
    // Hold starts after the first quiet chunk and fires at 2.1s of audio
    let stats = WavStore::new().inspect(&dir.path().join("memo.wav")).unwrap();
    assert_eq!(stats.frames, 21 * CHUNK as u32);
    assert_eq!(
        err.user_message(),
        "Klaida įrašymo metu: Įrašymas per trumpas: (2.10 s). Min 3s."
    );
}

#[tokio::test]
async fn speech_then_silence_is_transcribed() {
    let dir = TempDir::new().unwrap();
    let transcriber = RecordingTranscriber::default();
    let mut opts = options(&dir);
    opts.language = Language::Lithuanian;
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(speech_then_silence(30)),
        WavStore::new(),
        transcriber.clone(),
        opts,
    );

    let text = recorder
        .record_outcome(&RecordCallbacks::default())
        .await
        .unwrap();

    assert_eq!(text, "Kepta duona su sūriu");
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
    let (path, language) = transcriber.last.lock().unwrap().clone().unwrap();
    assert_eq!(path, dir.path().join("memo.wav"));
    assert_eq!(language, Language::Lithuanian);

    // 3s of speech plus 2.1s of trailing quiet audio
    let stats = WavStore::new().inspect(&path).unwrap();
    assert_eq!(stats.frames, 51 * CHUNK as u32);
    assert_eq!(stats.sample_rate, RATE);
}

#[tokio::test]
async fn samples_are_amplified_on_disk() {
    let dir = TempDir::new().unwrap();
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(speech_then_silence(40)),
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    recorder
        .capture(&RecordCallbacks::default())
        .await
        .unwrap();

    let mut reader = hound::WavReader::open(dir.path().join("memo.wav")).unwrap();
    let first: Vec<i16> = reader
        .samples::<i16>()
        .take(4)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(first, vec![1000; 4]);
}

#[tokio::test]
async fn stereo_device_records_frames_per_channel() {
    let dir = TempDir::new().unwrap();
    let mut mic = ScriptedMic::new(speech_then_silence(30));
    mic.channels = 2;
    let recorder = BoundedRecorder::new(
        mic,
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let recording = recorder
        .capture(&RecordCallbacks::default())
        .await
        .unwrap();

    assert_eq!(recording.stats.channels, 2);
    assert_eq!(recording.stats.frames, 51 * CHUNK as u32);
    assert_eq!(recording.stop_cause, StopCause::Silence);
}

#[tokio::test]
async fn external_stop_finalizes_and_validates() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(&dir);
    opts.limits.min_duration = Duration::from_millis(1);
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(vec![LOUD]).paced(StdDuration::from_millis(5)),
        WavStore::new(),
        RecordingTranscriber::default(),
        opts,
    );

    let capture = {
        let recorder = recorder.clone();
        tokio::spawn(async move { recorder.capture(&RecordCallbacks::default()).await })
    };
    while !recorder.is_recording() {
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    recorder.stop();
    recorder.stop();

    let recording = capture.await.unwrap().unwrap();
    assert_eq!(recording.stop_cause, StopCause::External);
    assert!(recording.stats.frames > 0);
    assert!(!recorder.is_recording());
}

#[tokio::test]
async fn stop_while_device_is_opening_is_not_lost() {
    let dir = TempDir::new().unwrap();
    let mut mic = ScriptedMic::new(vec![LOUD]).paced(StdDuration::from_millis(10));
    mic.open_delay = StdDuration::from_millis(300);
    let recorder = BoundedRecorder::new(
        mic,
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let started = Arc::new(AtomicBool::new(false));
    let started_flag = Arc::clone(&started);
    let capture = {
        let recorder = recorder.clone();
        tokio::spawn(async move {
            let callbacks = RecordCallbacks {
                on_recording_start: Some(Box::new(move || {
                    started_flag.store(true, Ordering::SeqCst)
                })),
                ..Default::default()
            };
            recorder.capture(&callbacks).await
        })
    };
    tokio::time::sleep(StdDuration::from_millis(100)).await;
    assert!(recorder.is_recording());

    recorder.stop();

    let err = capture.await.unwrap().unwrap_err();
    assert_eq!(err, RecorderError::EmptyRecording);
    assert!(!started.load(Ordering::SeqCst));
    assert!(!recorder.is_recording());
}

#[tokio::test]
async fn interrupt_while_device_is_opening_is_not_lost() {
    let dir = TempDir::new().unwrap();
    let mut mic = ScriptedMic::new(vec![LOUD]).paced(StdDuration::from_millis(10));
    mic.open_delay = StdDuration::from_millis(300);
    let recorder = BoundedRecorder::new(
        mic,
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let capture = {
        let recorder = recorder.clone();
        tokio::spawn(async move { recorder.capture(&RecordCallbacks::default()).await })
    };
    tokio::time::sleep(StdDuration::from_millis(100)).await;

    // What the Ctrl+C handler does
    recorder.stop_flag().store(false, Ordering::SeqCst);

    let err = capture.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), RecorderErrorKind::EmptyRecording);
}

#[tokio::test]
async fn ceiling_reports_too_long_and_leaves_valid_file() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(&dir);
    opts.limits.max_duration = Duration::from_millis(300);
    let transcriber = RecordingTranscriber::default();
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(vec![LOUD]).paced(StdDuration::from_millis(10)),
        WavStore::new(),
        transcriber.clone(),
        opts,
    );

    let err = recorder
        .record_outcome(&RecordCallbacks::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RecorderError::TooLong {
            recorded_secs: None,
            max: Duration::from_millis(300),
        }
    );
    assert_eq!(err.to_string(), "Įrašymas per ilgas (max 300ms)");
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
    // Finalized, so the header is readable
    assert!(WavStore::new().inspect(&dir.path().join("memo.wav")).unwrap().frames > 0);
}

#[tokio::test]
async fn zero_channel_device_reports_once_and_keeps_previous_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memo.wav");
    std::fs::write(&path, b"previous recording").unwrap();

    let mut mic = ScriptedMic::new(vec![LOUD]);
    mic.channels = 0;
    let recorder = BoundedRecorder::new(
        mic,
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    recorder
        .record(RecordCallbacks::default(), move |outcome| {
            sink.lock().unwrap().push(outcome);
        })
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].as_ref().unwrap_err().kind(), RecorderErrorKind::DeviceError);
    assert_eq!(std::fs::read(&path).unwrap(), b"previous recording");
}

#[tokio::test]
async fn stream_error_ends_capture() {
    let dir = TempDir::new().unwrap();
    let mut mic = ScriptedMic::new(vec![LOUD]);
    mic.error_after = Some(5);
    let recorder = BoundedRecorder::new(
        mic,
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let err = recorder
        .capture(&RecordCallbacks::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RecorderErrorKind::Other);
    assert!(err.to_string().contains("device unplugged"));
}

#[tokio::test]
async fn require_speech_ignores_leading_silence() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(&dir);
    opts.silence.require_speech = true;
    // 3s of silence, 1s of speech, then silence
    let mut script = vec![QUIET; 30];
    script.extend(vec![LOUD; 10]);
    script.push(QUIET);
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(script),
        WavStore::new(),
        RecordingTranscriber::default(),
        opts,
    );

    let recording = recorder
        .capture(&RecordCallbacks::default())
        .await
        .unwrap();

    assert_eq!(recording.stats.frames, 61 * CHUNK as u32);
}

#[tokio::test]
async fn callback_runs_off_the_audio_thread_exactly_once() {
    let dir = TempDir::new().unwrap();
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(speech_then_silence(30)),
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    recorder
        .record(RecordCallbacks::default(), move |outcome| {
            let thread_name = thread::current().name().map(str::to_string);
            sink.lock().unwrap().push((thread_name, outcome));
        })
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_ne!(seen[0].0.as_deref(), Some("fake-audio"));
    assert_eq!(seen[0].1, Ok("Kepta duona su sūriu".to_string()));
}

#[tokio::test]
async fn transcription_failure_is_reported_as_other() {
    let dir = TempDir::new().unwrap();
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(speech_then_silence(30)),
        WavStore::new(),
        FailingTranscriber,
        options(&dir),
    );

    let err = recorder
        .record_outcome(&RecordCallbacks::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RecorderErrorKind::Other);
    assert!(err.to_string().starts_with("Klaida transkribuojant:"));
}

#[tokio::test]
async fn status_callbacks_fire_in_order() {
    let dir = TempDir::new().unwrap();
    let recorder = BoundedRecorder::new(
        ScriptedMic::new(speech_then_silence(30)),
        WavStore::new(),
        RecordingTranscriber::default(),
        options(&dir),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let (a, b, c) = (Arc::clone(&events), Arc::clone(&events), Arc::clone(&events));
    let callbacks = RecordCallbacks {
        on_recording_start: Some(Box::new(move || a.lock().unwrap().push("start"))),
        on_recording_end: Some(Box::new(move |_| b.lock().unwrap().push("end"))),
        on_transcribing_start: Some(Box::new(move || c.lock().unwrap().push("transcribe"))),
    };

    recorder.record_outcome(&callbacks).await.unwrap();

    assert_eq!(*events.lock().unwrap(), vec!["start", "end", "transcribe"]);
}
