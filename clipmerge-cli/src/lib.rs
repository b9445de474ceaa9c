//! Command-line front end for clipmerge-core.
//!
//! The binary in `main.rs` parses arguments with [`cli::Cli`], installs
//! logging and dispatches to the functions in [`commands`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

pub use cli::{Cli, Commands, InputArgs, MergeArgs, ProbeArgs, ValidateArgs};
pub use commands::{run_merge, run_probe, run_validate};
pub use error::{CliErrorContext, CliResult};
