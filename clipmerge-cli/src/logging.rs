// clipmerge-cli/src/logging.rs
//
// Logging setup for the CLI. Library code logs through the `log` facade;
// this module installs a `fern` dispatcher with a coloured console sink and
// an optional per-run log file.

use crate::error::{CliErrorContext, CliResult};
use clipmerge_core::CoreError;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Console level for the number of `-v` flags.
pub fn console_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger.
///
/// Engine chatter (`ffmpeg_log`) and percentage lines (`clipmerge::progress`)
/// only reach the console at higher verbosity since the progress bar already
/// shows them. When `log_dir` is given, everything at debug and above is
/// also written to `clipmerge_<timestamp>.log` there, whose path is returned.
pub fn init_logging(verbosity: u8, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let chatter = if verbosity >= 2 {
        LevelFilter::Trace
    } else {
        LevelFilter::Warn
    };

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("{:>5} {}", colors.color(record.level()), message))
        })
        .level(console_level(verbosity))
        .level_for("ffmpeg_log", chatter)
        .level_for("clipmerge::progress", chatter)
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new()
        .level(LevelFilter::Trace)
        .chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).cli_with_context(|| {
                format!("Failed to create log directory '{}'", dir.display())
            })?;
            let path = dir.join(format!("clipmerge_{}.log", get_timestamp()));
            let file = fern::log_file(&path)
                .cli_with_context(|| format!("Failed to open log file '{}'", path.display()))?;

            root = root.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "{} [{}] [{}] {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .level(LevelFilter::Debug)
                    .chain(file),
            );
            Some(path)
        }
        None => None,
    };

    root.apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))?;
    Ok(log_path)
}
