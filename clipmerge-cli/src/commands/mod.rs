//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! helpers here turn command-line paths into the core's input and
//! configuration types.

/// Full merge of clips and an audio track.
pub mod merge;

/// Metadata dump for one media file.
pub mod probe;

/// Admission and validation without encoding.
pub mod validate;

pub use merge::run_merge;
pub use probe::run_probe;
pub use validate::run_validate;

use crate::cli::InputArgs;
use crate::error::{CliErrorContext, CliResult};
use clipmerge_core::{CoreConfig, MediaInput};
use std::path::Path;

/// Builds the configuration: file (or defaults), then `CLIPMERGE_*` variables.
///
/// Command-specific flags are applied by the caller, which validates last.
pub fn load_config(config_file: Option<&Path>) -> CliResult<CoreConfig> {
    let mut config = match config_file {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            CoreConfig::from_toml_file(path)?
        }
        None => CoreConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

/// MIME type guessed from the file extension.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "flv" => "video/x-flv",
        "mp3" => "audio/mpeg",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Describes one file on disk as a job input.
pub fn media_input(path: &Path) -> CliResult<MediaInput> {
    MediaInput::from_path(path, guess_mime_type(path))
        .cli_with_context(|| format!("Cannot read input '{}'", path.display()))
}

/// Describes the videos and the audio track named on the command line.
pub fn job_inputs(args: &InputArgs) -> CliResult<(Vec<MediaInput>, MediaInput)> {
    let videos = args
        .videos
        .iter()
        .map(|path| media_input(path))
        .collect::<CliResult<Vec<_>>>()?;
    let audio = media_input(&args.audio)?;
    Ok((videos, audio))
}
