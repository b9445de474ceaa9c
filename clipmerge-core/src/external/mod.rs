//! Interactions with the external media engine.
//!
//! The pipeline never launches ffmpeg or ffprobe directly. It goes through
//! the [`FfmpegSpawner`] and [`FfprobeExecutor`] traits so callers can supply
//! their own implementations (the integration tests use mocks).

use crate::error::{CoreError, CoreResult};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs a stage command to completion with progress handling
pub mod ffmpeg;

/// Common ffmpeg command construction
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

pub use ffmpeg::run_ffmpeg;
pub use ffmpeg_builder::{FfmpegCommandBuilder, command_args};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor};

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd> -version` with output discarded. A missing binary maps to
/// `DependencyNotFound`; any other spawn failure to `CommandStart`.
pub fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let cmd_name = cmd.display().to_string();
    let result = Command::new(cmd)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(crate::error::command_start_error(cmd_name, e))
        }
    }
}

/// Determines if an ffmpeg stderr line is noise rather than a real problem.
pub(crate) fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("Stream map")
        || error.contains("automatically inserted filter")
        || error.contains("Timestamps are unset")
        || error.contains("does not match the corresponding codec")
        || error.contains("Queue input is backward")
        || error.contains("first frame is no keyframe")
        || error.contains("Skipping NAL unit")
}

/// Helpers for tests that need a real child process standing in for the engine.
#[cfg(all(test, unix))]
pub(crate) mod test_support {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Writes an executable shell script named `name` into `dir`.
    pub(crate) fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Script body that records its pid in `pid_file`, then sleeps as that pid.
    pub(crate) fn stall_body(pid_file: &Path, secs: u32) -> String {
        format!("echo $$ > '{}'\nexec sleep {secs}", pid_file.display())
    }

    /// True once the process is gone and reaped.
    pub(crate) fn is_reaped(pid_file: &Path) -> bool {
        let pid = std::fs::read_to_string(pid_file).unwrap();
        !Path::new("/proc").join(pid.trim()).exists()
    }
}
