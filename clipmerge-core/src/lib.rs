//! Core library for merging video clips with an audio track using ffmpeg and ffprobe.
//!
//! A merge job validates every submitted clip and the audio track, re-encodes
//! each clip to one canonical profile, concatenates the clips in submission
//! order and muxes the audio on top. Intermediates live in a per-job working
//! directory that is always cleaned up.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipmerge_core::external::{CommandFfprobeExecutor, SidecarSpawner};
//! use clipmerge_core::{CoreConfig, MediaInput, PipelineJob, run_merge_job};
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! let spawner = SidecarSpawner::new(config.engine.encode_timeout());
//! let prober = CommandFfprobeExecutor::new(
//!     config.engine.ffprobe_path.clone(),
//!     config.engine.probe_timeout(),
//! );
//!
//! let videos = vec![
//!     MediaInput::from_path(Path::new("intro.mp4"), "video/mp4").unwrap(),
//!     MediaInput::from_path(Path::new("main.webm"), "video/webm").unwrap(),
//! ];
//! let audio = MediaInput::from_path(Path::new("song.mp3"), "audio/mpeg").unwrap();
//!
//! match run_merge_job(&spawner, &prober, &config, PipelineJob::new(videos, audio), None) {
//!     Ok(output) => println!("merged into {}", output.output_path.display()),
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod pipeline;
pub mod processing;
pub mod progress;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, ValidationPolicy};
pub use error::{CoreError, CoreResult};
pub use external::check_dependency;
pub use media::{MediaInput, MediaMetadata, StreamDescriptor, StreamKind};
pub use pipeline::{JobError, JobState, MergeOutput, PipelineJob, StageTimings, run_merge_job};
pub use progress::{ProgressCallback, ProgressEvent};
pub use temp_files::{generate_job_id, relocate_output};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
