//! Re-encoding of each clip to the canonical profile.

use super::stage_error;
use crate::config::{CanonicalProfile, CoreConfig};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, run_ffmpeg};
use crate::media::MediaInput;
use crate::pipeline::JobState;
use crate::progress::{FfmpegProgressHandler, ProgressCallback};
use crate::temp_files;
use ffmpeg_sidecar::command::FfmpegCommand;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Builds the normalize command. Source audio is dropped; the job's audio
/// comes from the separate track at the mux stage.
pub fn build_normalize_command(
    ffmpeg: Option<&Path>,
    input: &Path,
    output: &Path,
    profile: &CanonicalProfile,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new().with_program(ffmpeg).build();
    cmd.input(input.to_string_lossy().as_ref());
    cmd.args(profile.video_args());
    cmd.arg("-an");
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Normalizes one clip into `processed_<index>` inside `work_dir`.
///
/// `expected_duration` is the probed clip length and only drives progress.
pub fn normalize<S: FfmpegSpawner>(
    spawner: &S,
    input: &MediaInput,
    index: usize,
    work_dir: &Path,
    config: &CoreConfig,
    expected_duration: f64,
    progress: Option<&ProgressCallback>,
) -> CoreResult<PathBuf> {
    let output = temp_files::processed_path(work_dir, index, &config.profile.container);
    log::info!(
        target: "clipmerge::progress",
        "Normalizing clip {} '{}'",
        index + 1,
        input.display_name
    );

    let cmd = build_normalize_command(
        config.engine.ffmpeg_path.as_deref(),
        &input.path,
        &output,
        &config.profile,
    );
    let mut handler = FfmpegProgressHandler::new(
        JobState::Normalizing,
        Some(index),
        Some(expected_duration),
        progress.cloned(),
    );

    run_ffmpeg(spawner, cmd, "normalize", &mut handler).map_err(|e| {
        stage_error(e, |cause| CoreError::Encode {
            file: input.display_name.clone(),
            cause,
        })
    })?;

    Ok(output)
}

/// Normalizes every clip, up to `config.max_parallel_jobs` at a time.
///
/// Results keep submission order. The first failure stops new clips from
/// being scheduled; clips already running are allowed to finish.
pub fn normalize_all<S: FfmpegSpawner + Sync>(
    spawner: &S,
    inputs: &[MediaInput],
    durations: &[f64],
    work_dir: &Path,
    config: &CoreConfig,
    progress: Option<&ProgressCallback>,
) -> CoreResult<Vec<PathBuf>> {
    let threads = config.max_parallel_jobs.clamp(1, inputs.len().max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("clipmerge-normalize-{i}"))
        .build()
        .map_err(|e| CoreError::Internal(format!("Failed to initialize thread pool: {e}")))?;

    log::debug!("Normalizing {} clip(s) on {} thread(s)", inputs.len(), threads);

    pool.install(|| {
        inputs
            .par_iter()
            .enumerate()
            .map(|(index, input)| {
                let duration = durations.get(index).copied().unwrap_or(0.0);
                normalize(spawner, input, index, work_dir, config, duration, progress)
            })
            .collect()
    })
}
