// clipmerge-cli/src/progress.rs
//
// Terminal progress display for a merge job, driven by the core's
// progress events.

use clipmerge_core::{JobState, ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};

const BAR_TEMPLATE: &str = "{spinner:.green} {msg:<24} [{bar:40.cyan/blue}] {pos:>3}%";

/// Label shown next to the bar while the job is in `state`.
pub fn state_label(state: JobState, clip_count: usize) -> String {
    match state {
        JobState::Validating => "Validating inputs".to_string(),
        JobState::Normalizing => format!("Normalizing {clip_count} clip(s)"),
        JobState::Concatenating => "Joining clips".to_string(),
        JobState::Muxing => "Adding audio".to_string(),
        JobState::Done => "Done".to_string(),
        JobState::Failed => "Failed".to_string(),
    }
}

/// Progress bar for one merge job.
///
/// Normalization runs clips concurrently, so the bar shows the mean of the
/// per-clip percentages during that stage.
#[derive(Clone)]
pub struct JobProgress {
    bar: ProgressBar,
    clip_count: usize,
    clip_percents: Arc<Mutex<Vec<f32>>>,
}

impl JobProgress {
    pub fn new(clip_count: usize) -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self::with_bar(bar, clip_count)
    }

    /// Wraps an existing bar, e.g. a hidden one.
    pub fn with_bar(bar: ProgressBar, clip_count: usize) -> Self {
        Self {
            bar,
            clip_count,
            clip_percents: Arc::new(Mutex::new(vec![0.0; clip_count])),
        }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Callback to hand to the merge job.
    pub fn callback(&self) -> ProgressCallback {
        let progress = self.clone();
        Arc::new(move |event: &ProgressEvent| progress.handle(event))
    }

    fn handle(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::StateChanged { state, .. } => {
                self.bar.set_message(state_label(*state, self.clip_count));
                match state {
                    JobState::Done => self.bar.finish_with_message("Done"),
                    JobState::Failed => self.bar.abandon_with_message("Failed"),
                    _ => self.bar.set_position(0),
                }
            }
            ProgressEvent::Encoding {
                stage: JobState::Normalizing,
                item: Some(index),
                percent,
                ..
            } => {
                if let Ok(mut percents) = self.clip_percents.lock() {
                    if let Some(slot) = percents.get_mut(*index) {
                        *slot = *percent;
                    }
                    let mean = percents.iter().sum::<f32>() / percents.len().max(1) as f32;
                    self.bar.set_position(mean.round() as u64);
                }
            }
            ProgressEvent::Encoding { percent, .. } => {
                self.bar.set_position(percent.round() as u64);
            }
        }
    }
}
