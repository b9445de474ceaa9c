//! Configuration structures and constants for the clipmerge-core library.
//!
//! [`CoreConfig`] bundles the acceptance policy, the canonical encoding
//! profile, engine settings and job-level resource limits. It can be built in
//! code (see [`CoreConfigBuilder`]), loaded from a TOML file, and adjusted
//! through `CLIPMERGE_*` environment variables.

mod builder;
mod encoding;
mod policy;
mod utils;

pub use builder::CoreConfigBuilder;
pub use encoding::{AudioProfile, CanonicalProfile};
pub use policy::{
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_VIDEOS, DEFAULT_MAX_WIDTH,
    ValidationPolicy,
};

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use utils::{get_env_list, get_env_path, get_env_u32, get_env_u64, get_env_usize};

/// Default bound on a single ffprobe invocation, in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Default bound on a single ffmpeg invocation, in seconds.
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 600;

/// Upper bound for the default normalize parallelism.
pub const DEFAULT_MAX_PARALLEL_JOBS: usize = 4;

/// Location and time limits of the external engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ffmpeg binary; `None` resolves "ffmpeg" from PATH
    pub ffmpeg_path: Option<PathBuf>,

    /// ffprobe binary
    pub ffprobe_path: PathBuf,

    pub probe_timeout_secs: u64,

    pub encode_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: PathBuf::from("ffprobe"),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            encode_timeout_secs: DEFAULT_ENCODE_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    #[must_use]
    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.encode_timeout_secs)
    }

    /// Program name used for ffmpeg, for dependency checks and messages.
    #[must_use]
    pub fn ffmpeg_program(&self) -> String {
        self.ffmpeg_path
            .as_ref()
            .map_or_else(|| "ffmpeg".to_string(), |p| p.display().to_string())
    }
}

/// Main configuration structure for the clipmerge-core library.
///
/// # Examples
///
/// ```rust,no_run
/// use clipmerge_core::config::CoreConfig;
///
/// let mut config = CoreConfig::from_toml_file("clipmerge.toml".as_ref()).unwrap();
/// config.apply_env_overrides();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub policy: ValidationPolicy,

    pub profile: CanonicalProfile,

    pub audio: AudioProfile,

    pub engine: EngineConfig,

    /// Directory under which per-job working directories are created
    pub work_root: PathBuf,

    /// Maximum number of clips normalized concurrently within one job
    pub max_parallel_jobs: usize,

    /// Delete the submitted inputs once the job terminates
    pub delete_inputs: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            profile: CanonicalProfile::default(),
            audio: AudioProfile::default(),
            engine: EngineConfig::default(),
            work_root: std::env::temp_dir(),
            max_parallel_jobs: default_parallelism(),
            delete_inputs: true,
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map_or(1, |n| n.get())
        .min(DEFAULT_MAX_PARALLEL_JOBS)
}

impl CoreConfig {
    /// Creates a configuration with defaults and the given work root.
    pub fn new(work_root: PathBuf) -> Self {
        Self {
            work_root,
            ..Default::default()
        }
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Applies `CLIPMERGE_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        let policy = &mut self.policy;
        policy.max_videos = get_env_usize("CLIPMERGE_MAX_VIDEOS", policy.max_videos);
        policy.max_file_size = get_env_u64("CLIPMERGE_MAX_FILE_SIZE", policy.max_file_size);
        policy.max_width = get_env_u32("CLIPMERGE_MAX_WIDTH", policy.max_width);
        policy.max_height = get_env_u32("CLIPMERGE_MAX_HEIGHT", policy.max_height);
        policy.video_codecs =
            get_env_list("CLIPMERGE_VIDEO_CODECS", std::mem::take(&mut policy.video_codecs));
        policy.audio_codecs =
            get_env_list("CLIPMERGE_AUDIO_CODECS", std::mem::take(&mut policy.audio_codecs));

        let engine = &mut self.engine;
        engine.probe_timeout_secs =
            get_env_u64("CLIPMERGE_PROBE_TIMEOUT", engine.probe_timeout_secs);
        engine.encode_timeout_secs =
            get_env_u64("CLIPMERGE_ENCODE_TIMEOUT", engine.encode_timeout_secs);
        engine.ffprobe_path =
            get_env_path("CLIPMERGE_FFPROBE", std::mem::take(&mut engine.ffprobe_path));
        if let Ok(path) = std::env::var("CLIPMERGE_FFMPEG") {
            engine.ffmpeg_path = Some(PathBuf::from(path));
        }

        self.max_parallel_jobs = get_env_usize("CLIPMERGE_PARALLEL_JOBS", self.max_parallel_jobs);
        self.work_root = get_env_path("CLIPMERGE_WORK_DIR", std::mem::take(&mut self.work_root));
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        let policy = &self.policy;
        if policy.max_videos == 0 {
            return Err(CoreError::Config("max_videos must be at least 1".to_string()));
        }
        if policy.max_file_size == 0 {
            return Err(CoreError::Config("max_file_size must be positive".to_string()));
        }
        if policy.max_width == 0 || policy.max_height == 0 {
            return Err(CoreError::Config(format!(
                "Invalid resolution limit {}x{}",
                policy.max_width, policy.max_height
            )));
        }
        if policy.video_codecs.is_empty() || policy.audio_codecs.is_empty() {
            return Err(CoreError::Config("Codec whitelists must not be empty".to_string()));
        }
        if self.profile.crf > 51 {
            return Err(CoreError::Config(format!(
                "crf must be between 0 and 51, got {}",
                self.profile.crf
            )));
        }
        if self.profile.frame_rate == 0 {
            return Err(CoreError::Config("frame_rate must be positive".to_string()));
        }
        if self.audio.bitrate_kbps == 0 {
            return Err(CoreError::Config("Audio bitrate must be positive".to_string()));
        }
        if self.engine.probe_timeout_secs == 0 || self.engine.encode_timeout_secs == 0 {
            return Err(CoreError::Config("Engine timeouts must be positive".to_string()));
        }
        if self.max_parallel_jobs == 0 {
            return Err(CoreError::Config("max_parallel_jobs must be at least 1".to_string()));
        }
        Ok(())
    }
}
