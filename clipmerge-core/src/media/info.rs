use serde::Serialize;
use std::fmt;

/// Kind of an elementary stream inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

impl From<&str> for StreamKind {
    fn from(s: &str) -> Self {
        match s {
            "video" => StreamKind::Video,
            "audio" => StreamKind::Audio,
            _ => StreamKind::Other,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Other => write!(f, "other"),
        }
    }
}

/// One stream as reported by ffprobe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDescriptor {
    pub kind: StreamKind,
    pub codec_name: String,
    /// Only present for video streams
    pub width: Option<u32>,
    /// Only present for video streams
    pub height: Option<u32>,
}

impl StreamDescriptor {
    pub fn video(codec: &str, width: u32, height: u32) -> Self {
        Self {
            kind: StreamKind::Video,
            codec_name: codec.to_string(),
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn audio(codec: &str) -> Self {
        Self {
            kind: StreamKind::Audio,
            codec_name: codec.to_string(),
            width: None,
            height: None,
        }
    }
}

/// Container and stream metadata for one probed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaMetadata {
    /// Overall duration in seconds
    pub duration_secs: f64,
    /// Container format name (e.g. "mov,mp4,m4a,3gp,3g2,mj2")
    pub format_name: String,
    /// Streams in container order
    pub streams: Vec<StreamDescriptor>,
}

impl MediaMetadata {
    /// First video stream, in container order.
    #[must_use]
    pub fn primary_video_stream(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.kind == StreamKind::Video)
    }

    /// First audio stream, in container order.
    #[must_use]
    pub fn primary_audio_stream(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.kind == StreamKind::Audio)
    }

    #[must_use]
    pub fn count_of(&self, kind: StreamKind) -> usize {
        self.streams.iter().filter(|s| s.kind == kind).count()
    }
}
