//! Implementation of the 'merge' subcommand.
//!
//! Describes the inputs, runs the cheap admission checks before touching any
//! external tool, then hands the job to clipmerge-core and moves the result
//! to the requested output path.

use crate::cli::MergeArgs;
use crate::commands::{job_inputs, load_config};
use crate::error::{CliErrorContext, CliResult};
use crate::progress::JobProgress;

use clipmerge_core::external::{CommandFfprobeExecutor, SidecarSpawner};
use clipmerge_core::processing::validate_admission;
use clipmerge_core::{
    CoreConfig, MergeOutput, PipelineJob, check_dependency, format_bytes, format_duration,
    relocate_output, run_merge_job,
};

use log::{debug, error, info, warn};
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Applies the merge flags on top of the file/environment configuration.
pub fn merge_config(args: &MergeArgs, config_file: Option<&Path>) -> CliResult<CoreConfig> {
    let mut config = load_config(config_file)?;

    if let Some(work_dir) = &args.work_dir {
        config.work_root = work_dir.clone();
    }
    if let Some(jobs) = args.jobs {
        config.max_parallel_jobs = jobs;
    }
    if let Some(timeout) = args.timeout {
        config.engine.encode_timeout_secs = timeout;
    }
    // Files named on the command line belong to the user.
    config.delete_inputs = args.consume_inputs;

    config.validate()?;
    Ok(config)
}

/// Runs a full merge job.
pub fn run_merge(args: MergeArgs, config_file: Option<&Path>) -> anyhow::Result<()> {
    let config = merge_config(&args, config_file)?;
    let (videos, audio) = job_inputs(&args.inputs)?;

    validate_admission(&videos, &audio, &config.policy)?;

    let ffmpeg = PathBuf::from(config.engine.ffmpeg_program());
    check_dependency(&ffmpeg)?;
    check_dependency(&config.engine.ffprobe_path)?;

    fs::create_dir_all(&config.work_root).cli_with_context(|| {
        format!(
            "Failed to create work directory '{}'",
            config.work_root.display()
        )
    })?;

    let spawner = SidecarSpawner::new(config.engine.encode_timeout());
    let prober = CommandFfprobeExecutor::new(
        config.engine.ffprobe_path.clone(),
        config.engine.probe_timeout(),
    );

    let job = PipelineJob::new(videos, audio);
    info!(
        "Starting job {} with {} clip(s) and audio '{}'",
        job.job_id,
        job.videos.len(),
        job.audio.display_name
    );

    let progress = JobProgress::new(job.videos.len());
    let output = match run_merge_job(&spawner, &prober, &config, job, Some(progress.callback())) {
        Ok(output) => output,
        Err(e) => {
            progress.bar().abandon();
            error!("{e}");
            return Err(e.into());
        }
    };

    let final_path = deliver_output(&output, &args.output)?;
    print_summary(&output, &final_path);
    Ok(())
}

/// Moves the merged file to `destination` and removes the job's work directory.
///
/// The work directory is removed even when the move fails, so a failed
/// delivery never leaves an orphaned copy of the merge in the work root.
pub fn deliver_output(output: &MergeOutput, destination: &Path) -> CliResult<PathBuf> {
    let relocated = relocate_output(&output.output_path, destination);
    if let Err(e) = &relocated {
        error!(
            "Could not move {} to {}: {}",
            output.output_path.display(),
            destination.display(),
            e
        );
    }

    if let Err(e) = fs::remove_dir_all(&output.work_dir) {
        warn!(
            "Failed to remove work directory {}: {}",
            output.work_dir.display(),
            e
        );
    }

    relocated.cli_with_context(|| {
        format!("Failed to write output '{}'", destination.display())
    })
}

fn print_summary(output: &MergeOutput, final_path: &Path) {
    let size = fs::metadata(final_path).map(|m| m.len()).unwrap_or(0);
    let timings = &output.timings;

    debug!(
        "Stage timings for {}: validating {:.1}s, normalizing {:.1}s, concatenating {:.1}s, muxing {:.1}s",
        output.job_id,
        timings.validating.as_secs_f64(),
        timings.normalizing.as_secs_f64(),
        timings.concatenating.as_secs_f64(),
        timings.muxing.as_secs_f64()
    );

    println!();
    println!("{}", "Merge complete".green().bold());
    println!("  {} {}", "Output:  ".bold(), final_path.display());
    println!("  {} {}", "Size:    ".bold(), format_bytes(size));
    println!(
        "  {} {}",
        "Duration:".bold(),
        format_duration(output.expected_duration_secs)
    );
    println!(
        "  {} {}",
        "Elapsed: ".bold(),
        format_duration(timings.total().as_secs_f64())
    );
}
