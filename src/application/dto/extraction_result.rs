//! Extraction result DTO

use super::format_bytes;
use std::path::PathBuf;
use std::time::Duration;

/// Result of writing carved files to disk
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Output directory
    pub output_dir: PathBuf,
    /// Artifacts written
    pub files_written: usize,
    /// Total bytes written
    pub bytes_written: u64,
    /// Duration of the operation
    pub duration: Duration,
    /// Errors encountered
    pub errors: Vec<String>,
}

impl ExtractionResult {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            files_written: 0,
            bytes_written: 0,
            duration: Duration::ZERO,
            errors: Vec::new(),
        }
    }

    pub fn add_written(&mut self, size: u64) {
        self.files_written += 1;
        self.bytes_written += size;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a summary string
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Extracted {} files ({}) to {} in {:.2}s\n",
            self.files_written,
            format_bytes(self.bytes_written),
            self.output_dir.display(),
            self.duration.as_secs_f64()
        );

        if !self.errors.is_empty() {
            summary.push_str(&format!("{} errors occurred\n", self.errors.len()));
            for error in &self.errors {
                summary.push_str(&format!("  - {error}\n"));
            }
        }

        summary
    }
}
