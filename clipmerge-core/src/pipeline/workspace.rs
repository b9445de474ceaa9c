//! Scoped working directory of one merge job.

use crate::error::{CoreError, CoreResult};
use crate::temp_files;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Owns the job directory from creation until the job terminates.
///
/// If the workspace is dropped without being finished (an early return or a
/// panic unwinding through the job), the directory is removed by `TempDir`.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    pub fn create(work_root: &Path, job_id: &str) -> CoreResult<Self> {
        let dir = temp_files::create_job_dir(work_root, job_id)?;
        log::debug!("Created job workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes every entry except `artifact` and hands the directory over to
    /// the caller, who now owns both.
    pub fn finish_success(self, artifact: &Path) -> PathBuf {
        sweep_except(self.dir.path(), Some(artifact));
        self.dir.keep()
    }

    /// Removes the directory and everything in it.
    pub fn finish_failure(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(source) = self.dir.close() {
            log_cleanup_error(CoreError::Cleanup {
                path: path.display().to_string(),
                source,
            });
        }
    }
}

/// Deletes directory entries other than `keep`. Failures are logged.
fn sweep_except(dir: &Path, keep: Option<&Path>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            log_cleanup_error(CoreError::Cleanup {
                path: dir.display().to_string(),
                source,
            });
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if keep.is_some_and(|k| k == path) {
            continue;
        }
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => log::debug!("Removed intermediate {}", path.display()),
            Err(source) => log_cleanup_error(CoreError::Cleanup {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Deletes a submitted input, logging instead of failing.
pub(crate) fn remove_input(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed consumed input {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => log_cleanup_error(CoreError::Cleanup {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn log_cleanup_error(err: CoreError) {
    log::warn!("{err}");
}
