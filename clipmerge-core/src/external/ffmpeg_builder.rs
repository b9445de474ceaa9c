//! ffmpeg command builder utilities
//!
//! Every pipeline stage starts its command from [`FfmpegCommandBuilder`] so
//! the binary location and the common flags stay in one place.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::Path;

/// Builder for creating ffmpeg commands with common configurations
///
/// Commands always carry `-hide_banner` and `-y`, since stages write into a
/// job directory they own and may re-run into the same output.
pub struct FfmpegCommandBuilder<'a> {
    program: Option<&'a Path>,
}

impl Default for FfmpegCommandBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FfmpegCommandBuilder<'a> {
    /// Creates a builder that hides the banner and overwrites outputs
    #[must_use]
    pub fn new() -> Self {
        Self { program: None }
    }

    /// Uses a specific ffmpeg binary instead of resolving it from PATH
    #[must_use]
    pub fn with_program(mut self, program: Option<&'a Path>) -> Self {
        self.program = program;
        self
    }

    #[must_use]
    pub fn build(self) -> FfmpegCommand {
        let mut cmd = match self.program {
            Some(path) => FfmpegCommand::new_with_path(path),
            None => FfmpegCommand::new(),
        };

        cmd.hide_banner();
        cmd.overwrite();

        cmd
    }
}

/// Arguments of a built command, for logging and assertions.
pub fn command_args(cmd: &FfmpegCommand) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}
