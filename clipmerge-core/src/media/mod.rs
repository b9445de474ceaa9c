//! Media data model.
//!
//! [`MediaInput`] describes an uploaded file handed to the pipeline, and the
//! `info` submodule holds the probe results produced for it.

pub mod info;

pub use info::{MediaMetadata, StreamDescriptor, StreamKind};

use std::path::{Path, PathBuf};

/// An uploaded file reference, owned by the caller until the job consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInput {
    /// Absolute path of the stored upload
    pub path: PathBuf,
    /// Original file name as shown to the end user
    pub display_name: String,
    /// MIME type declared by the uploader
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
}

impl MediaInput {
    pub fn new(
        path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    /// Builds an input from a file on disk, taking the size from its metadata
    /// and the display name from its file name.
    pub fn from_path(path: &Path, mime_type: impl Into<String>) -> std::io::Result<Self> {
        let size = std::fs::metadata(path)?.len();
        let display_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(path, display_name, mime_type, size))
    }
}
