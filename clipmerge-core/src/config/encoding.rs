//! Encoding configuration module
//!
//! Defines the canonical profile every clip is normalized to and the audio
//! settings used when the soundtrack is muxed onto the concatenated video.

use serde::{Deserialize, Serialize};

/// Target profile shared by the normalize and concat stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalProfile {
    /// ffmpeg video encoder name
    pub video_codec: String,

    /// Constant rate factor (0-51, lower is better quality)
    pub crf: u8,

    /// Encoder speed/quality preset
    pub preset: String,

    /// Constant output frame rate
    pub frame_rate: u32,

    /// Output pixel format
    pub pixel_format: String,

    /// File extension (and therefore container) of every artifact
    pub container: String,

    /// Relocate the moov atom to the head of the file
    pub faststart: bool,
}

impl Default for CanonicalProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            frame_rate: 30,
            pixel_format: "yuv420p".to_string(),
            container: "mp4".to_string(),
            faststart: true,
        }
    }
}

impl CanonicalProfile {
    /// Video encoding arguments, in the order ffmpeg receives them.
    #[must_use]
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-r".to_string(),
            self.frame_rate.to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
        ];
        args.extend(self.container_args());
        args
    }

    /// Container layout arguments shared with the mux stage.
    #[must_use]
    pub fn container_args(&self) -> Vec<String> {
        if self.faststart {
            vec!["-movflags".to_string(), "+faststart".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Audio settings for the final mux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProfile {
    /// ffmpeg audio encoder name
    pub codec: String,

    /// Target bitrate in kbps
    pub bitrate_kbps: u32,
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            bitrate_kbps: 192,
        }
    }
}
