//! ffmpeg process management.
//!
//! [`FfmpegSpawner`] and [`FfmpegProcess`] are the seam between the pipeline
//! stages and the real engine. The sidecar implementation bounds every run
//! with a deadline: events are forwarded from a reader thread over a channel
//! and the caller blocks on `recv_timeout`, killing the child once the
//! deadline passes.

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    ///
    /// Returns once the engine closes its output, the handler fails, or the
    /// process deadline expires.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an `FfmpegProcess`.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// Wrapper around the sidecar child that enforces a deadline.
pub struct SidecarProcess {
    child: SidecarChild,
    timeout: Duration,
    deadline: Instant,
}

impl SidecarProcess {
    fn kill_and_reap(&mut self) {
        if let Err(e) = self.child.kill() {
            log::warn!("Failed to kill ffmpeg: {}", e);
        }
        if let Err(e) = self.child.wait() {
            log::warn!("Failed to reap ffmpeg: {}", e);
        }
    }
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.child.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            CoreError::Internal(format!("ffmpeg event stream unavailable: {e}"))
        })?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for event in iterator {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(event) => {
                    if let Err(e) = handler(event) {
                        self.kill_and_reap();
                        return Err(e);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
                Err(RecvTimeoutError::Timeout) => {
                    log::error!(
                        "ffmpeg exceeded its {}s limit, killing it",
                        self.timeout.as_secs()
                    );
                    self.kill_and_reap();
                    return Err(CoreError::Timeout {
                        command: "ffmpeg".to_string(),
                        timeout: self.timeout,
                    });
                }
            }
        }
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
///
/// Every process it spawns is killed once `timeout` has elapsed.
#[derive(Debug, Clone)]
pub struct SidecarSpawner {
    timeout: Duration,
}

impl SidecarSpawner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SidecarSpawner {
    fn default() -> Self {
        Self::new(Duration::from_secs(
            crate::config::DEFAULT_ENCODE_TIMEOUT_SECS,
        ))
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))?;
        Ok(SidecarProcess {
            child,
            timeout: self.timeout,
            deadline: Instant::now() + self.timeout,
        })
    }
}
