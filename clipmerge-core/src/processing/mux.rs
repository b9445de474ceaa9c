//! Combining the concatenated video with the audio track.

use super::stage_error;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, run_ffmpeg};
use crate::pipeline::JobState;
use crate::progress::{FfmpegProgressHandler, ProgressCallback};
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::Path;

/// Builds the mux command: first video stream of `video`, first audio
/// stream of `audio`, video copied, audio re-encoded, cut to the shorter.
pub fn build_mux_command(
    config: &CoreConfig,
    video: &Path,
    audio: &Path,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new()
        .with_program(config.engine.ffmpeg_path.as_deref())
        .build();
    cmd.input(video.to_string_lossy().as_ref());
    cmd.input(audio.to_string_lossy().as_ref());
    cmd.args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy"]);
    cmd.args(["-c:a", config.audio.codec.as_str()]);
    cmd.args(["-b:a", &format!("{}k", config.audio.bitrate_kbps)]);
    cmd.arg("-shortest");
    cmd.args(config.profile.container_args());
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Muxes `video` and `audio` into `output`.
///
/// `expected_duration` should be `min(video, audio)`, the length `-shortest`
/// produces.
pub fn mux<S: FfmpegSpawner>(
    spawner: &S,
    video: &Path,
    audio: &Path,
    output: &Path,
    config: &CoreConfig,
    expected_duration: f64,
    progress: Option<&ProgressCallback>,
) -> CoreResult<()> {
    log::info!(
        target: "clipmerge::progress",
        "Muxing audio track into {}",
        output.display()
    );

    let cmd = build_mux_command(config, video, audio, output);
    let mut handler = FfmpegProgressHandler::new(
        JobState::Muxing,
        None,
        Some(expected_duration),
        progress.cloned(),
    );
    run_ffmpeg(spawner, cmd, "mux", &mut handler)
        .map_err(|e| stage_error(e, |cause| CoreError::Mux { cause }))
}
