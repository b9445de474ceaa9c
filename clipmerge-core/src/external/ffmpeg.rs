//! Execution of one ffmpeg stage command.

use super::ffmpeg_builder::command_args;
use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use crate::error::{CoreResult, command_failed_error};
use crate::progress::FfmpegProgressHandler;
use ffmpeg_sidecar::command::FfmpegCommand;

/// Spawns `cmd`, streams its events through `handler` and waits for exit.
///
/// A non-zero exit becomes `CommandFailed` carrying the critical stderr
/// lines the handler collected. Timeouts surface unchanged.
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    cmd: FfmpegCommand,
    label: &str,
    handler: &mut FfmpegProgressHandler,
) -> CoreResult<()> {
    log::debug!("Running ffmpeg ({}): {}", label, command_args(&cmd).join(" "));

    let mut process = spawner.spawn(cmd)?;
    process.handle_events(|event| handler.handle_event(event))?;
    let status = process.wait()?;

    if status.success() {
        log::debug!("ffmpeg ({}) finished successfully", label);
        Ok(())
    } else {
        let stderr = handler.stderr_buffer().trim();
        log::error!("ffmpeg ({}) exited with {}: {}", label, status, stderr);
        Err(command_failed_error(
            format!("ffmpeg ({label})"),
            status,
            if stderr.is_empty() {
                format!("no diagnostic output, exit status {status}")
            } else {
                stderr.to_string()
            },
        ))
    }
}
