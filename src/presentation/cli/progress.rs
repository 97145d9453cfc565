//! Progress reporting for CLI

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Progress reporter using indicatif
pub struct ProgressReporter {
    bar: Arc<ProgressBar>,
}

impl ProgressReporter {
    fn styled(bar: ProgressBar, template: &str, message: &str) -> Self {
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(message.to_string());
        Self { bar: Arc::new(bar) }
    }

    /// Spinner shown while the image is scanned and reconciled
    pub fn for_scan(image_size: u64) -> Self {
        let reporter = Self::styled(
            ProgressBar::new_spinner(),
            "{spinner:.green} [{elapsed_precise}] {msg}",
            &format!("Scanning {} bytes for signatures...", image_size),
        );
        reporter.bar.enable_steady_tick(Duration::from_millis(100));
        reporter
    }

    /// Creates a progress reporter for extraction
    pub fn for_recovery(total_files: u64) -> Self {
        Self::styled(
            ProgressBar::new(total_files),
            "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files ({eta})",
            "Writing carved files...",
        )
    }

    /// Finishes with a message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Removes the bar from the terminal
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Gets a callback for extraction progress
    pub fn recovery_callback(&self) -> Box<dyn Fn(usize, usize) + Send + Sync> {
        let bar = Arc::clone(&self.bar);
        Box::new(move |current: usize, total: usize| {
            bar.set_position(current as u64);
            bar.set_length(total as u64);
        })
    }
}
