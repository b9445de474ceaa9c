//! Error types for clipmerge-core.
//!
//! Every stage of the merge pipeline reports failures through [`CoreError`].
//! Validation variants name the offending input by its display name so the
//! end user can tell which upload to fix; engine variants carry the raw
//! ffmpeg diagnostic for operators.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Result type for clipmerge-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    // ---- Ambient ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    OperationFailed(String),

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start {command}: {source}")]
    CommandStart {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for {command}: {source}")]
    CommandWait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    // ---- Admission ----
    #[error("At least one video is required")]
    NoVideoInputs,

    #[error("Too many videos: {count} submitted, at most {max} allowed")]
    TooManyVideos { count: usize, max: usize },

    #[error("File '{file}' is too large ({size} bytes, limit {max} bytes)")]
    FileTooLarge { file: String, size: u64, max: u64 },

    // ---- Probing and validation ----
    #[error("Could not read media file '{file}': {reason}")]
    Probe { file: String, reason: String },

    #[error("File '{0}' does not contain a video stream")]
    NoVideoStream(String),

    #[error("File '{0}' does not contain an audio stream")]
    NoAudioStream(String),

    #[error("File '{file}' uses unsupported {kind} codec '{codec}'")]
    UnsupportedCodec {
        file: String,
        kind: &'static str,
        codec: String,
    },

    #[error("File '{file}' resolution {width}x{height} exceeds the {max_width}x{max_height} limit")]
    ResolutionTooHigh {
        file: String,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    // ---- Engine stages ----
    #[error("Failed to normalize '{file}': {cause}")]
    Encode { file: String, cause: String },

    #[error("Failed to concatenate clips: {cause}")]
    Concat { cause: String },

    #[error("Failed to mux audio track: {cause}")]
    Mux { cause: String },

    #[error("{command} timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    // ---- Lifecycle ----
    #[error("Failed to remove '{path}': {source}")]
    Cleanup {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// True for errors caused by the submitted media rather than the engine.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::NoVideoInputs
                | CoreError::TooManyVideos { .. }
                | CoreError::FileTooLarge { .. }
                | CoreError::Probe { .. }
                | CoreError::NoVideoStream(_)
                | CoreError::NoAudioStream(_)
                | CoreError::UnsupportedCodec { .. }
                | CoreError::ResolutionTooHigh { .. }
        )
    }
}

pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        command: command.into(),
        source,
    }
}

pub fn command_wait_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandWait {
        command: command.into(),
        source,
    }
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
