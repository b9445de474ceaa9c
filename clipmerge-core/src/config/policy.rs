//! Acceptance policy for submitted media.

use serde::{Deserialize, Serialize};

/// 100 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const DEFAULT_MAX_VIDEOS: usize = 20;

pub const DEFAULT_MAX_WIDTH: u32 = 3840;

pub const DEFAULT_MAX_HEIGHT: u32 = 2160;

/// Limits and codec whitelists applied to every merge job.
///
/// A policy is read-only for the lifetime of a job; the orchestrator only
/// ever borrows it immutably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Accepted video codec names as reported by ffprobe
    pub video_codecs: Vec<String>,

    /// Accepted audio codec names as reported by ffprobe
    pub audio_codecs: Vec<String>,

    /// Maximum accepted width in pixels (inclusive)
    pub max_width: u32,

    /// Maximum accepted height in pixels (inclusive)
    pub max_height: u32,

    /// Maximum number of video inputs per job
    pub max_videos: usize,

    /// Maximum size of any single input in bytes
    pub max_file_size: u64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            video_codecs: ["h264", "hevc", "vp8", "vp9"].map(String::from).to_vec(),
            audio_codecs: ["aac", "mp3", "opus", "vorbis"].map(String::from).to_vec(),
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            max_videos: DEFAULT_MAX_VIDEOS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ValidationPolicy {
    #[must_use]
    pub fn accepts_video_codec(&self, codec: &str) -> bool {
        self.video_codecs.iter().any(|c| c.eq_ignore_ascii_case(codec))
    }

    #[must_use]
    pub fn accepts_audio_codec(&self, codec: &str) -> bool {
        self.audio_codecs.iter().any(|c| c.eq_ignore_ascii_case(codec))
    }

    /// Both bounds are inclusive.
    #[must_use]
    pub fn accepts_resolution(&self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}
