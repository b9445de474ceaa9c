//! Progress reporting for merge jobs.
//!
//! Callers observe a job through an optional [`ProgressCallback`]. The
//! orchestrator reports state transitions and the engine stages report
//! percentages through [`FfmpegProgressHandler`].

pub mod ffmpeg_handler;

pub use ffmpeg_handler::FfmpegProgressHandler;

use crate::pipeline::JobState;
use std::sync::Arc;

/// Event delivered to a [`ProgressCallback`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The job entered a new state.
    StateChanged { job_id: String, state: JobState },

    /// An engine run made progress.
    Encoding {
        stage: JobState,
        /// Clip index during normalization
        item: Option<usize>,
        percent: f32,
        current_secs: f64,
        total_secs: f64,
    },
}

/// Callback receiving progress events; may be invoked from worker threads.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

pub(crate) fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = callback {
        callback(&event);
    }
}
