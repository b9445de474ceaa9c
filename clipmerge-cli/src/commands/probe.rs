//! Implementation of the 'probe' subcommand.

use crate::cli::ProbeArgs;
use crate::commands::load_config;

use clipmerge_core::external::{CommandFfprobeExecutor, FfprobeExecutor};
use clipmerge_core::utils::get_filename_safe;
use clipmerge_core::{CoreError, MediaMetadata, format_bytes, format_duration};

use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

/// Probes one file and prints its metadata.
pub fn run_probe(args: ProbeArgs, config_file: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_file)?;
    config.validate()?;

    if !args.path.is_file() {
        return Err(CoreError::PathError(format!(
            "Input file '{}' does not exist",
            args.path.display()
        ))
        .into());
    }

    let prober = CommandFfprobeExecutor::new(
        config.engine.ffprobe_path.clone(),
        config.engine.probe_timeout(),
    );
    let metadata = prober.probe(&args.path)?;

    if args.json {
        let json = serde_json::to_string_pretty(&metadata)?;
        println!("{json}");
    } else {
        let size = fs::metadata(&args.path).map(|m| m.len()).unwrap_or(0);
        println!("{}", render_metadata(&args.path, size, &metadata));
    }
    Ok(())
}

/// Human-readable rendering of probe results.
pub fn render_metadata(path: &Path, size: u64, metadata: &MediaMetadata) -> String {
    let name = get_filename_safe(path).unwrap_or_else(|_| path.display().to_string());

    let mut lines = vec![
        format!("{} {}", "File:    ".bold(), name),
        format!("{} {}", "Format:  ".bold(), metadata.format_name),
        format!(
            "{} {} ({:.2}s)",
            "Duration:".bold(),
            format_duration(metadata.duration_secs),
            metadata.duration_secs
        ),
        format!("{} {}", "Size:    ".bold(), format_bytes(size)),
        format!("{}", "Streams:".bold()),
    ];
    for (index, stream) in metadata.streams.iter().enumerate() {
        let line = match (stream.width, stream.height) {
            (Some(w), Some(h)) => format!("  #{index} {} {} {w}x{h}", stream.kind, stream.codec_name),
            _ => format!("  #{index} {} {}", stream.kind, stream.codec_name),
        };
        lines.push(line);
    }
    lines.join("\n")
}
