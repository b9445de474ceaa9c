//! Implementation of the 'validate' subcommand.
//!
//! Runs the same admission and probe-based checks a merge job starts with,
//! then stops. Nothing is encoded and no input is touched.

use crate::cli::ValidateArgs;
use crate::commands::{job_inputs, load_config};

use clipmerge_core::external::CommandFfprobeExecutor;
use clipmerge_core::pipeline::expected_mux_duration;
use clipmerge_core::processing::{validate_admission, validate_audio, validate_videos};
use clipmerge_core::{check_dependency, format_duration};

use log::info;
use owo_colors::OwoColorize;
use std::path::Path;

/// Checks the inputs against the validation policy.
pub fn run_validate(args: ValidateArgs, config_file: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_file)?;
    config.validate()?;

    let (videos, audio) = job_inputs(&args.inputs)?;
    validate_admission(&videos, &audio, &config.policy)?;
    check_dependency(&config.engine.ffprobe_path)?;

    let prober = CommandFfprobeExecutor::new(
        config.engine.ffprobe_path.clone(),
        config.engine.probe_timeout(),
    );

    let video_metadata = validate_videos(&prober, &videos, &config.policy)?;
    let audio_metadata = validate_audio(&prober, &audio, &config.policy)?;

    for (input, metadata) in videos.iter().zip(&video_metadata) {
        println!(
            "{} {} ({})",
            "ok".green(),
            input.display_name,
            format_duration(metadata.duration_secs)
        );
    }
    println!(
        "{} {} ({})",
        "ok".green(),
        audio.display_name,
        format_duration(audio_metadata.duration_secs)
    );

    let video_secs: f64 = video_metadata.iter().map(|m| m.duration_secs).sum();
    let expected = expected_mux_duration(video_secs, audio_metadata.duration_secs);
    info!(
        "{} input(s) accepted; merged output would run about {}",
        videos.len() + 1,
        format_duration(expected)
    );
    Ok(())
}
