//! ffmpeg progress handler
//!
//! Turns engine events into [`ProgressEvent::Encoding`] updates, forwards
//! engine log lines to the `ffmpeg_log` target and keeps the stderr lines
//! that matter for a failure report.

use super::{ProgressCallback, ProgressEvent, emit};
use crate::error::CoreResult;
use crate::external::is_non_critical_ffmpeg_error;
use crate::pipeline::JobState;
use crate::utils::{format_duration, parse_ffmpeg_time, percent_of};
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};
use std::time::Instant;

/// Minimum change in percent between two callback invocations.
const REPORT_STEP_PERCENT: f32 = 3.0;

/// Handler for ffmpeg progress events
pub struct FfmpegProgressHandler {
    stage: JobState,
    item: Option<usize>,
    duration: Option<f64>,
    callback: Option<ProgressCallback>,
    start_time: Instant,
    last_progress_percent: f32,
    last_logged_percent_threshold: i32,
    stderr_buffer: String,
}

impl FfmpegProgressHandler {
    /// `duration` is the expected length of the output in seconds, used as
    /// the 100% mark. Zero or `None` disables percentages.
    #[must_use]
    pub fn new(
        stage: JobState,
        item: Option<usize>,
        duration: Option<f64>,
        callback: Option<ProgressCallback>,
    ) -> Self {
        Self {
            stage,
            item,
            duration: duration.filter(|d| *d > 0.0),
            callback,
            start_time: Instant::now(),
            last_progress_percent: -REPORT_STEP_PERCENT,
            last_logged_percent_threshold: -1,
            stderr_buffer: String::new(),
        }
    }

    /// Handles an ffmpeg event
    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
        Ok(())
    }

    /// Stderr lines worth showing when the run fails
    #[must_use]
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        let Some(total) = self.duration else {
            return;
        };

        let current_secs = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);
        let percent = percent_of(current_secs, total);

        if percent >= self.last_progress_percent + REPORT_STEP_PERCENT
            || (percent >= 100.0 && self.last_progress_percent < 100.0)
        {
            emit(
                self.callback.as_ref(),
                ProgressEvent::Encoding {
                    stage: self.stage,
                    item: self.item,
                    percent,
                    current_secs,
                    total_secs: total,
                },
            );
            self.log_progress_if_needed(percent, current_secs, total, progress.speed);
            self.last_progress_percent = percent;
        }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        let log_level = map_ffmpeg_log_level(level);
        if log_level <= log::Level::Warn {
            // Fatal and error lines explain a non-zero exit.
            if log_level == log::Level::Error && !is_non_critical_ffmpeg_error(message) {
                self.push_stderr(message);
            }
            log::log!(target: "ffmpeg_log", log_level, "{message}");
        } else {
            log::trace!(target: "ffmpeg_log", "{message}");
        }
    }

    fn handle_error(&mut self, error: &str) {
        if is_non_critical_ffmpeg_error(error) {
            log::debug!("ffmpeg non-critical message: {error}");
        } else {
            log::debug!(target: "ffmpeg_log", "ffmpeg stderr error: {error}");
            self.push_stderr(error);
        }
    }

    fn push_stderr(&mut self, line: &str) {
        self.stderr_buffer.push_str(line);
        self.stderr_buffer.push('\n');
    }

    fn log_progress_if_needed(&mut self, percent: f32, current_secs: f64, total: f64, speed: f32) {
        let current_threshold = (percent as i32 / 25) * 25;
        if current_threshold > self.last_logged_percent_threshold {
            log::info!(
                target: "clipmerge::progress",
                "{}{}: {:.1}% | {} / {} | Speed: {:.2}x | Elapsed: {}",
                self.stage,
                self.item.map(|i| format!(" clip {}", i + 1)).unwrap_or_default(),
                percent,
                format_duration(current_secs),
                format_duration(total),
                speed,
                format_duration(self.start_time.elapsed().as_secs_f64())
            );
            self.last_logged_percent_threshold = current_threshold;
        }
    }
}

/// Maps ffmpeg log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}
