//! The pipeline stages.
//!
//! Each submodule implements one stage in isolation. Sequencing, the job
//! state machine and cleanup live in [`crate::pipeline`].

/// Admission checks and probe-based validation
pub mod validation;

/// Re-encoding each clip to the canonical profile
pub mod normalize;

/// Joining normalized clips in playback order
pub mod concat;

/// Adding the audio track
pub mod mux;

pub use concat::{concatenate, write_manifest};
pub use mux::mux;
pub use normalize::{normalize, normalize_all};
pub use validation::{validate_admission, validate_audio, validate_video, validate_videos};

use crate::error::CoreError;

/// Converts an engine failure into the stage's error variant.
///
/// Process failures become `wrap(cause)` where the cause is the engine's
/// diagnostic. Timeouts and internal errors pass through unchanged.
pub(crate) fn stage_error(err: CoreError, wrap: impl FnOnce(String) -> CoreError) -> CoreError {
    match err {
        CoreError::CommandFailed { stderr, .. } => wrap(stderr),
        CoreError::CommandStart { .. } | CoreError::CommandWait { .. } | CoreError::Io(_) => {
            wrap(err.to_string())
        }
        other => other,
    }
}
