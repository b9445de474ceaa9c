//! Per-job working directory and artifact naming.
//!
//! Each merge job owns a uniquely named directory under the configured work
//! root. It is created with the tempfile crate so an early return or a panic
//! unwinding through the job still removes it via `Drop`.

use crate::error::{CoreError, CoreResult};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Name of the concat demuxer manifest.
pub const MANIFEST_FILE_NAME: &str = "filelist.txt";

/// Name of the concatenated intermediate.
pub const CONCATENATED_FILE_NAME: &str = "concatenated.mp4";

/// Returns a job identifier of the form `YYYYMMDD_HHMMSS_xxxxxx`.
pub fn generate_job_id() -> String {
    use rand::distributions::Alphanumeric;
    use rand::{Rng, thread_rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    format!(
        "{}_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        random_suffix
    )
}

/// Creates the working directory for one job. Auto-cleaned when dropped.
pub fn create_job_dir(work_root: &Path, job_id: &str) -> CoreResult<TempDir> {
    fs::create_dir_all(work_root)?;

    Ok(TempFileBuilder::new()
        .prefix(&format!("clipmerge_{job_id}_"))
        .tempdir_in(work_root)?)
}

/// Path of the normalized intermediate for the clip at `index`.
///
/// The name depends only on the index, so normalizing the same clip twice
/// overwrites the earlier result.
pub fn processed_path(work_dir: &Path, index: usize, container: &str) -> PathBuf {
    work_dir.join(format!("processed_{index}.{container}"))
}

pub fn manifest_path(work_dir: &Path) -> PathBuf {
    work_dir.join(MANIFEST_FILE_NAME)
}

pub fn concatenated_path(work_dir: &Path) -> PathBuf {
    work_dir.join(CONCATENATED_FILE_NAME)
}

pub fn final_path(work_dir: &Path, job_id: &str, container: &str) -> PathBuf {
    work_dir.join(format!("merged_{job_id}.{container}"))
}

/// Moves a finished artifact to `destination`.
///
/// Tries a rename first and falls back to copy + remove when the two paths
/// live on different filesystems. Parent directories of the destination are
/// created as needed.
pub fn relocate_output(source: &Path, destination: &Path) -> CoreResult<PathBuf> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match fs::rename(source, destination) {
        Ok(()) => {
            debug!(
                "Renamed {} to {}",
                source.display(),
                destination.display()
            );
        }
        Err(rename_err) => {
            debug!(
                "Rename of {} failed ({}), copying instead",
                source.display(),
                rename_err
            );
            fs::copy(source, destination).map_err(|e| {
                CoreError::PathError(format!(
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    e
                ))
            })?;
            if let Err(e) = fs::remove_file(source) {
                warn!("Copied output but could not remove {}: {}", source.display(), e);
            }
        }
    }

    Ok(destination.to_path_buf())
}
