//! Merge job orchestration.
//!
//! [`run_merge_job`] drives one [`PipelineJob`] through the stages:
//!
//! ```text
//! Validating -> Normalizing -> Concatenating -> Muxing -> Done
//!      \             \               \             \
//!       +-------------+---------------+-------------+--> Failed
//! ```
//!
//! The job owns a private working directory. Whatever the outcome, every
//! intermediate is removed before the function returns; on success only the
//! final artifact remains.

pub mod workspace;

pub use workspace::JobWorkspace;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::media::MediaInput;
use crate::processing::{
    concatenate, mux, normalize_all, validate_admission, validate_audio, validate_videos,
};
use crate::progress::{ProgressCallback, ProgressEvent, emit};
use crate::temp_files;
use serde::Serialize;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lifecycle state of a merge job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JobState {
    Validating,
    Normalizing,
    Concatenating,
    Muxing,
    Done,
    Failed,
}

impl JobState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }

    /// Forward by exactly one stage, or to `Failed` from any non-terminal state.
    #[must_use]
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Validating, Normalizing)
            | (Normalizing, Concatenating)
            | (Concatenating, Muxing)
            | (Muxing, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Validating => "Validating",
            JobState::Normalizing => "Normalizing",
            JobState::Concatenating => "Concatenating",
            JobState::Muxing => "Muxing",
            JobState::Done => "Done",
            JobState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// A merge request accepted for processing.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub job_id: String,
    /// Clips in playback order
    pub videos: Vec<MediaInput>,
    pub audio: MediaInput,
}

impl PipelineJob {
    /// Creates a job with a freshly generated identifier.
    pub fn new(videos: Vec<MediaInput>, audio: MediaInput) -> Self {
        Self::with_id(temp_files::generate_job_id(), videos, audio)
    }

    pub fn with_id(job_id: impl Into<String>, videos: Vec<MediaInput>, audio: MediaInput) -> Self {
        Self {
            job_id: job_id.into(),
            videos,
            audio,
        }
    }
}

/// Failure of a merge job, tagged with the stage it happened in.
#[derive(Debug)]
pub struct JobError {
    pub job_id: String,
    pub stage: JobState,
    pub source: CoreError,
}

impl JobError {
    /// Message suitable for the end user.
    ///
    /// Validation problems are returned verbatim since they name the file to
    /// fix. Engine failures are summarized; the diagnostic stays in the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.source.is_validation() {
            return self.source.to_string();
        }
        match (&self.source, self.stage) {
            (CoreError::Timeout { .. }, _) => {
                "Processing took too long and was stopped. Try shorter or fewer clips.".to_string()
            }
            (_, JobState::Normalizing) => "One of the videos could not be processed.".to_string(),
            (_, JobState::Concatenating) => "The videos could not be joined together.".to_string(),
            (_, JobState::Muxing) => "The audio track could not be added to the video.".to_string(),
            _ => "An internal error occurred while processing the merge.".to_string(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job {} failed while {}: {}",
            self.job_id,
            self.stage.to_string().to_lowercase(),
            self.source
        )
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Wall-clock time spent in each stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub validating: Duration,
    pub normalizing: Duration,
    pub concatenating: Duration,
    pub muxing: Duration,
}

impl StageTimings {
    #[must_use]
    pub fn total(&self) -> Duration {
        self.validating + self.normalizing + self.concatenating + self.muxing
    }
}

/// Result of a successful merge job.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub job_id: String,
    /// The final artifact; now owned by the caller
    pub output_path: PathBuf,
    /// Directory holding the artifact and nothing else; owned by the caller
    pub work_dir: PathBuf,
    /// Duration the mux stage produces, `min(video, audio)`
    pub expected_duration_secs: f64,
    pub timings: StageTimings,
}

/// Length `-shortest` yields. Unknown (zero) durations are ignored.
#[must_use]
pub fn expected_mux_duration(video_secs: f64, audio_secs: f64) -> f64 {
    match (video_secs > 0.0, audio_secs > 0.0) {
        (true, true) => video_secs.min(audio_secs),
        (true, false) => video_secs,
        (false, true) => audio_secs,
        (false, false) => 0.0,
    }
}

/// Tracks the current state and reports every transition.
struct StateMachine<'a> {
    job_id: &'a str,
    state: JobState,
    progress: Option<&'a ProgressCallback>,
}

impl<'a> StateMachine<'a> {
    fn start(job_id: &'a str, progress: Option<&'a ProgressCallback>) -> Self {
        let machine = Self {
            job_id,
            state: JobState::Validating,
            progress,
        };
        machine.announce();
        machine
    }

    fn advance(&mut self, next: JobState) -> CoreResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(CoreError::Internal(format!(
                "illegal job state transition {} -> {}",
                self.state, next
            )));
        }
        log::debug!("Job {}: {} -> {}", self.job_id, self.state, next);
        self.state = next;
        self.announce();
        Ok(())
    }

    fn announce(&self) {
        emit(
            self.progress,
            ProgressEvent::StateChanged {
                job_id: self.job_id.to_string(),
                state: self.state,
            },
        );
    }
}

/// Runs a merge job to completion.
///
/// On success the returned [`MergeOutput`] names the final artifact, which
/// is the only file left in the job directory. On failure the job directory
/// no longer exists. With `config.delete_inputs` the submitted files are
/// removed in both cases.
pub fn run_merge_job<S, P>(
    spawner: &S,
    prober: &P,
    config: &CoreConfig,
    job: PipelineJob,
    progress: Option<ProgressCallback>,
) -> Result<MergeOutput, JobError>
where
    S: FfmpegSpawner + Sync,
    P: FfprobeExecutor + ?Sized,
{
    let progress = progress.as_ref();
    let mut machine = StateMachine::start(&job.job_id, progress);
    log::info!(
        "Job {}: merging {} clip(s) with audio '{}'",
        job.job_id,
        job.videos.len(),
        job.audio.display_name
    );

    let workspace = match JobWorkspace::create(&config.work_root, &job.job_id) {
        Ok(workspace) => workspace,
        Err(source) => {
            let stage = machine.state;
            let _ = machine.advance(JobState::Failed);
            consume_inputs(config, &job);
            return Err(JobError {
                job_id: job.job_id.clone(),
                stage,
                source,
            });
        }
    };

    let mut timings = StageTimings::default();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        execute(
            spawner,
            prober,
            config,
            &job,
            workspace.path(),
            &mut machine,
            &mut timings,
            progress,
        )
    }))
    .unwrap_or_else(|payload| Err(CoreError::Internal(panic_message(payload.as_ref()))));

    let result = match outcome {
        Ok((final_path, expected_duration_secs)) => {
            let work_dir = workspace.finish_success(&final_path);
            match machine.advance(JobState::Done) {
                Ok(()) => {
                    log::info!(
                        "Job {}: finished in {:.1}s, output {}",
                        job.job_id,
                        timings.total().as_secs_f64(),
                        final_path.display()
                    );
                    Ok(MergeOutput {
                        job_id: job.job_id.clone(),
                        output_path: final_path,
                        work_dir,
                        expected_duration_secs,
                        timings,
                    })
                }
                Err(source) => Err(JobError {
                    job_id: job.job_id.clone(),
                    stage: machine.state,
                    source,
                }),
            }
        }
        Err(source) => {
            let stage = machine.state;
            log::error!("Job {}: failed while {}: {}", job.job_id, stage, source);
            workspace.finish_failure();
            let _ = machine.advance(JobState::Failed);
            Err(JobError {
                job_id: job.job_id.clone(),
                stage,
                source,
            })
        }
    };

    consume_inputs(config, &job);
    result
}

#[allow(clippy::too_many_arguments)]
fn execute<S, P>(
    spawner: &S,
    prober: &P,
    config: &CoreConfig,
    job: &PipelineJob,
    work_dir: &Path,
    machine: &mut StateMachine<'_>,
    timings: &mut StageTimings,
    progress: Option<&ProgressCallback>,
) -> CoreResult<(PathBuf, f64)>
where
    S: FfmpegSpawner + Sync,
    P: FfprobeExecutor + ?Sized,
{
    // STEP 1: VALIDATE ALL INPUTS BEFORE ANY ENCODING
    let started = Instant::now();
    validate_admission(&job.videos, &job.audio, &config.policy)?;
    let video_metadata = validate_videos(prober, &job.videos, &config.policy)?;
    let audio_metadata = validate_audio(prober, &job.audio, &config.policy)?;
    timings.validating = started.elapsed();

    let durations: Vec<f64> = video_metadata.iter().map(|m| m.duration_secs).collect();
    let video_secs: f64 = durations.iter().sum();

    // STEP 2: NORMALIZE EACH CLIP
    machine.advance(JobState::Normalizing)?;
    let started = Instant::now();
    let processed = normalize_all(spawner, &job.videos, &durations, work_dir, config, progress)?;
    timings.normalizing = started.elapsed();

    // STEP 3: CONCATENATE IN SUBMISSION ORDER
    machine.advance(JobState::Concatenating)?;
    let started = Instant::now();
    let concatenated = concatenate(spawner, &processed, work_dir, config, video_secs, progress)?;
    timings.concatenating = started.elapsed();

    // STEP 4: MUX THE AUDIO TRACK
    machine.advance(JobState::Muxing)?;
    let started = Instant::now();
    let expected = expected_mux_duration(video_secs, audio_metadata.duration_secs);
    let final_path = temp_files::final_path(work_dir, &job.job_id, &config.profile.container);
    mux(
        spawner,
        &concatenated,
        &job.audio.path,
        &final_path,
        config,
        expected,
        progress,
    )?;
    timings.muxing = started.elapsed();

    if !final_path.is_file() {
        return Err(CoreError::Mux {
            cause: format!("engine reported success but {} is missing", final_path.display()),
        });
    }

    Ok((final_path, expected))
}

fn consume_inputs(config: &CoreConfig, job: &PipelineJob) {
    if !config.delete_inputs {
        return;
    }
    for input in job.videos.iter().chain(std::iter::once(&job.audio)) {
        workspace::remove_input(&input.path);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("pipeline panicked: {detail}")
}
