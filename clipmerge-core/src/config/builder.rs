//! Builder pattern for [`CoreConfig`].

use std::path::PathBuf;

use super::{CoreConfig, ValidationPolicy};
use crate::error::CoreResult;

/// Fluent builder for [`CoreConfig`].
///
/// Every setting starts from its default, so only the values that differ
/// need to be named. [`build`](Self::build) runs [`CoreConfig::validate`].
///
/// # Examples
///
/// ```rust
/// use clipmerge_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .work_root(PathBuf::from("/tmp/clipmerge"))
///     .max_videos(10)
///     .max_parallel_jobs(2)
///     .encode_timeout_secs(300)
///     .delete_inputs(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.policy.max_videos, 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from TOML.
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    pub fn work_root(mut self, work_root: PathBuf) -> Self {
        self.config.work_root = work_root;
        self
    }

    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn max_videos(mut self, max: usize) -> Self {
        self.config.policy.max_videos = max;
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.policy.max_file_size = bytes;
        self
    }

    pub fn max_resolution(mut self, width: u32, height: u32) -> Self {
        self.config.policy.max_width = width;
        self.config.policy.max_height = height;
        self
    }

    pub fn crf(mut self, crf: u8) -> Self {
        self.config.profile.crf = crf;
        self
    }

    pub fn preset(mut self, preset: &str) -> Self {
        self.config.profile.preset = preset.to_string();
        self
    }

    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.config.profile.frame_rate = fps;
        self
    }

    pub fn audio_bitrate_kbps(mut self, kbps: u32) -> Self {
        self.config.audio.bitrate_kbps = kbps;
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.engine.ffmpeg_path = Some(path);
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.config.engine.ffprobe_path = path;
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.engine.probe_timeout_secs = secs;
        self
    }

    pub fn encode_timeout_secs(mut self, secs: u64) -> Self {
        self.config.engine.encode_timeout_secs = secs;
        self
    }

    pub fn max_parallel_jobs(mut self, jobs: usize) -> Self {
        self.config.max_parallel_jobs = jobs;
        self
    }

    pub fn delete_inputs(mut self, delete: bool) -> Self {
        self.config.delete_inputs = delete;
        self
    }

    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
