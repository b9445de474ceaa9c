// clipmerge-core/tests/common/mod.rs
//
// Shared mocks and fixtures for the merge job integration tests.

#![allow(dead_code)]

use clipmerge_core::error::{CoreError, CoreResult};
use clipmerge_core::external::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor};
use clipmerge_core::media::{MediaInput, MediaMetadata, StreamDescriptor};
use clipmerge_core::{CoreConfig, CoreConfigBuilder, ProgressCallback, ProgressEvent};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress};
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// ffmpeg
// ---------------------------------------------------------------------------

/// What a matching command does when spawned.
#[derive(Clone)]
pub enum MockOutcome {
    /// Exit with this code after emitting the events.
    Exit(i32, Vec<FfmpegEvent>),
    /// The deadline passes before the engine finishes.
    Timeout,
    /// Spawning fails as if the binary were missing.
    SpawnError,
    /// The spawn call itself panics.
    Panic,
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
    timeout: bool,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events.drain(..) {
            handler(event)?;
        }
        if self.timeout {
            return Err(CoreError::Timeout {
                command: "ffmpeg".to_string(),
                timeout: Duration::from_secs(600),
            });
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Mock implementation of FfmpegSpawner.
///
/// Every command succeeds and creates its output file (the last argument)
/// unless a rule whose pattern occurs in one of its arguments says otherwise.
/// Safe to share across the normalize worker threads.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    rules: Arc<Mutex<Vec<(String, MockOutcome)>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    manifests: Arc<Mutex<Vec<String>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, arg_pattern: &str, outcome: MockOutcome) {
        self.rules
            .lock()
            .unwrap()
            .push((arg_pattern.to_string(), outcome));
    }

    pub fn fail_with_exit(&self, arg_pattern: &str, exit_code: i32, stderr: &str) {
        self.on(
            arg_pattern,
            MockOutcome::Exit(exit_code, vec![FfmpegEvent::Error(stderr.to_string())]),
        );
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose arguments contain `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|args| args.iter().any(|a| a.contains(pattern)))
            .collect()
    }

    /// Contents of every concat manifest at the time it was handed to ffmpeg.
    pub fn manifests(&self) -> Vec<String> {
        self.manifests.lock().unwrap().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.calls.lock().unwrap().push(args.clone());

        for arg in args.iter().filter(|a| a.ends_with(".txt")) {
            if let Ok(contents) = std::fs::read_to_string(arg) {
                self.manifests.lock().unwrap().push(contents);
            }
        }

        let outcome = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| args.iter().any(|a| a.contains(pattern.as_str())))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or(MockOutcome::Exit(0, Vec::new()));

        match outcome {
            MockOutcome::Exit(code, events) => {
                if code == 0 {
                    if let Some(output) = args.last() {
                        std::fs::write(output, b"mock media").unwrap();
                    }
                }
                Ok(MockFfmpegProcess {
                    events,
                    exit_status: exit_status(code),
                    timeout: false,
                })
            }
            MockOutcome::Timeout => Ok(MockFfmpegProcess {
                events: Vec::new(),
                exit_status: exit_status(0),
                timeout: true,
            }),
            MockOutcome::SpawnError => Err(CoreError::CommandStart {
                command: "ffmpeg (sidecar)".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "ffmpeg not found"),
            }),
            MockOutcome::Panic => panic!("mock ffmpeg crashed on {args:?}"),
        }
    }
}

/// Exit status for a process that exited with `code`.
pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

pub fn progress_event(time: &str) -> FfmpegEvent {
    FfmpegEvent::Progress(FfmpegProgress {
        frame: 30,
        fps: 30.0,
        q: 23.0,
        size_kb: 256,
        time: time.to_string(),
        bitrate_kbps: 1200.0,
        speed: 2.0,
        raw_log_message: String::new(),
    })
}

// ---------------------------------------------------------------------------
// ffprobe
// ---------------------------------------------------------------------------

/// Mock implementation of FfprobeExecutor keyed by path.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Arc<Mutex<HashMap<PathBuf, Result<MediaMetadata, String>>>>,
    probed: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&self, path: &Path, metadata: MediaMetadata) {
        self.results
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Ok(metadata));
    }

    pub fn expect_failure(&self, path: &Path, reason: &str) {
        self.results
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Err(reason.to_string()));
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, path: &Path) -> CoreResult<MediaMetadata> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        match self.results.lock().unwrap().get(path) {
            Some(Ok(metadata)) => Ok(metadata.clone()),
            Some(Err(reason)) => Err(CoreError::Probe {
                file: path.display().to_string(),
                reason: reason.clone(),
            }),
            None => panic!("MockFfprobeExecutor: no expectation for {}", path.display()),
        }
    }
}

pub fn video_metadata(codec: &str, width: u32, height: u32, duration: f64) -> MediaMetadata {
    MediaMetadata {
        duration_secs: duration,
        format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        streams: vec![
            StreamDescriptor::video(codec, width, height),
            StreamDescriptor::audio("aac"),
        ],
    }
}

pub fn audio_metadata(codec: &str, duration: f64) -> MediaMetadata {
    MediaMetadata {
        duration_secs: duration,
        format_name: "mp3".to_string(),
        streams: vec![StreamDescriptor::audio(codec)],
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// Upload and work directories for one test.
pub struct Fixture {
    pub uploads: TempDir,
    pub work_root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            uploads: tempfile::tempdir().unwrap(),
            work_root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn config(&self) -> CoreConfig {
        CoreConfigBuilder::new()
            .work_root(self.work_root.path().to_path_buf())
            .max_parallel_jobs(2)
            .build()
            .unwrap()
    }

    /// Writes an upload to disk and returns its input descriptor.
    pub fn upload(&self, name: &str, mime: &str) -> MediaInput {
        let path = self.uploads.path().join(name);
        std::fs::write(&path, b"uploaded bytes").unwrap();
        MediaInput::from_path(&path, mime).unwrap()
    }

    /// Entries currently in the work root (one per surviving job directory).
    pub fn work_root_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.work_root.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

/// Progress callback that records every event.
pub fn recording_progress() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: ProgressCallback = Arc::new(move |event: &ProgressEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    (callback, events)
}
