//! Joining normalized clips with the concat demuxer.
//!
//! The manifest lists the intermediates in playback order. The join always
//! re-encodes with the canonical profile so timestamps and frame rate are
//! regenerated across clip boundaries.

use super::stage_error;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, run_ffmpeg};
use crate::pipeline::JobState;
use crate::progress::{FfmpegProgressHandler, ProgressCallback};
use crate::temp_files;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::fs;
use std::path::{Path, PathBuf};

/// Quotes a path for a concat manifest `file` directive.
fn quote_manifest_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Renders the manifest body, one `file '<path>'` line per clip.
pub fn manifest_contents(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file {}\n", quote_manifest_path(p)))
        .collect()
}

/// Writes the manifest into `work_dir` and returns its path.
pub fn write_manifest(paths: &[PathBuf], work_dir: &Path) -> CoreResult<PathBuf> {
    let manifest = temp_files::manifest_path(work_dir);
    fs::write(&manifest, manifest_contents(paths))?;
    log::debug!(
        "Wrote concat manifest with {} entries to {}",
        paths.len(),
        manifest.display()
    );
    Ok(manifest)
}

pub fn build_concat_command(
    config: &CoreConfig,
    manifest: &Path,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new()
        .with_program(config.engine.ffmpeg_path.as_deref())
        .build();
    cmd.args(["-f", "concat", "-safe", "0"]);
    cmd.input(manifest.to_string_lossy().as_ref());
    cmd.args(config.profile.video_args());
    cmd.arg("-an");
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Concatenates `paths` in order into `concatenated` inside `work_dir`.
///
/// A single clip still goes through the join so the output is always
/// produced the same way.
pub fn concatenate<S: FfmpegSpawner>(
    spawner: &S,
    paths: &[PathBuf],
    work_dir: &Path,
    config: &CoreConfig,
    expected_duration: f64,
    progress: Option<&ProgressCallback>,
) -> CoreResult<PathBuf> {
    if paths.is_empty() {
        return Err(CoreError::Concat {
            cause: "no clips to concatenate".to_string(),
        });
    }

    let manifest = write_manifest(paths, work_dir).map_err(|e| CoreError::Concat {
        cause: format!("failed to write manifest: {e}"),
    })?;
    let output = temp_files::concatenated_path(work_dir);
    log::info!(
        target: "clipmerge::progress",
        "Concatenating {} clip(s)",
        paths.len()
    );

    let cmd = build_concat_command(config, &manifest, &output);
    let mut handler = FfmpegProgressHandler::new(
        JobState::Concatenating,
        None,
        Some(expected_duration),
        progress.cloned(),
    );
    run_ffmpeg(spawner, cmd, "concat", &mut handler)
        .map_err(|e| stage_error(e, |cause| CoreError::Concat { cause }))?;

    Ok(output)
}
