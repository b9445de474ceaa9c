//! ffprobe integration for media inspection.
//!
//! Runs `ffprobe -v error -print_format json -show_format -show_streams` and
//! parses the JSON document into [`MediaMetadata`]. The process is bounded by
//! a timeout; output is collected on reader threads while the caller waits
//! on a channel. Past the deadline the child is killed and the probe fails
//! like any other unreadable file.

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use crate::media::{MediaMetadata, StreamDescriptor, StreamKind};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Trait for extracting media metadata from a file.
pub trait FfprobeExecutor {
    fn probe(&self, path: &Path) -> CoreResult<MediaMetadata>;
}

/// `FfprobeExecutor` that runs the ffprobe binary as a child process.
#[derive(Debug, Clone)]
pub struct CommandFfprobeExecutor {
    program: PathBuf,
    timeout: Duration,
}

impl CommandFfprobeExecutor {
    pub fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }
}

impl Default for CommandFfprobeExecutor {
    fn default() -> Self {
        Self::new(
            PathBuf::from("ffprobe"),
            Duration::from_secs(crate::config::DEFAULT_PROBE_TIMEOUT_SECS),
        )
    }
}

impl FfprobeExecutor for CommandFfprobeExecutor {
    fn probe(&self, path: &Path) -> CoreResult<MediaMetadata> {
        log::debug!("Running ffprobe on: {}", path.display());

        let mut child = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error("ffprobe", e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // stderr drains on its own thread so a chatty ffprobe cannot
            // block on a full pipe while stdout is still open.
            let err_reader = thread::spawn(move || read_pipe(stderr));
            let out = read_pipe(stdout);
            let err = err_reader.join().unwrap_or_default();
            let _ = tx.send((out, err));
        });

        let file = display_name(path);
        let (out, err) = match rx.recv_timeout(self.timeout) {
            Ok(output) => output,
            Err(RecvTimeoutError::Timeout) => {
                log::error!(
                    "ffprobe exceeded its {}s limit on {}, killing it",
                    self.timeout.as_secs(),
                    path.display()
                );
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill ffprobe: {}", e);
                }
                if let Err(e) = child.wait() {
                    log::warn!("Failed to reap ffprobe: {}", e);
                }
                return Err(CoreError::Probe {
                    file,
                    reason: format!("ffprobe timed out after {}s", self.timeout.as_secs()),
                });
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::Internal(
                    "ffprobe output reader terminated unexpectedly".to_string(),
                ));
            }
        };

        let status = child.wait().map_err(|e| command_wait_error("ffprobe", e))?;
        if !status.success() {
            let reason = if err.trim().is_empty() {
                format!("ffprobe exited with {status}")
            } else {
                err.trim().to_string()
            };
            return Err(CoreError::Probe { file, reason });
        }

        parse_probe_output(&out).map_err(|reason| CoreError::Probe { file, reason })
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut buf);
    }
    buf
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string())
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parses ffprobe's JSON document.
///
/// The container duration wins; without one the longest stream duration is
/// used, and failing that the duration is reported as zero.
pub(crate) fn parse_probe_output(json: &str) -> Result<MediaMetadata, String> {
    let output: ProbeOutput =
        serde_json::from_str(json).map_err(|e| format!("unreadable ffprobe output: {e}"))?;

    let Some(format) = output.format else {
        return Err("not a recognized media container".to_string());
    };

    let streams: Vec<StreamDescriptor> = output
        .streams
        .iter()
        .map(|s| {
            let kind = StreamKind::from(s.codec_type.as_deref().unwrap_or_default());
            let codec_name = s
                .codec_name
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            match kind {
                StreamKind::Video => StreamDescriptor {
                    kind,
                    codec_name,
                    width: s.width,
                    height: s.height,
                },
                _ => StreamDescriptor {
                    kind,
                    codec_name,
                    width: None,
                    height: None,
                },
            }
        })
        .collect();

    let duration_secs = parse_seconds(format.duration.as_deref())
        .or_else(|| {
            output
                .streams
                .iter()
                .filter_map(|s| parse_seconds(s.duration.as_deref()))
                .reduce(f64::max)
        })
        .unwrap_or_else(|| {
            log::warn!("ffprobe reported no duration, assuming 0.0s");
            0.0
        });

    Ok(MediaMetadata {
        duration_secs,
        format_name: format.format_name.unwrap_or_default(),
        streams,
    })
}
