// clipmerge-cli/src/cli.rs
//
// Command-line argument definitions for the clipmerge binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Clipmerge: join video clips and lay an audio track over them",
    long_about = "Validates a list of video clips and one audio track, re-encodes the clips \
                  to a common H.264/MP4 profile, concatenates them in the given order and \
                  muxes the audio on top using ffmpeg and ffprobe."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional TOML configuration file (limits, encoder profile, timeouts)
    #[arg(short, long, global = true, value_name = "FILE", env = "CLIPMERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for a debug-level log file of this run
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Increase console verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merges video clips and an audio track into one MP4 file
    Merge(MergeArgs),

    /// Prints the container and stream metadata of a media file
    Probe(ProbeArgs),

    /// Checks whether a set of inputs would be accepted, without encoding
    Validate(ValidateArgs),
}

/// The media submitted for one job.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Video clip, in playback order (repeat for each clip)
    #[arg(long = "video", value_name = "PATH", required = true)]
    pub videos: Vec<PathBuf>,

    /// Audio track laid over the merged video
    #[arg(long, value_name = "PATH")]
    pub audio: PathBuf,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Where the merged MP4 is written
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Parent directory for the per-job working directory
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Maximum number of clips normalized concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Timeout in seconds for each ffmpeg run
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Delete the input files once the job finishes, successful or not
    #[arg(long)]
    pub consume_inputs: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print the metadata as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}
