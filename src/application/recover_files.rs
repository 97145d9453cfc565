//! Report and extraction
//!
//! Digests the carved spans in parallel and writes them out sequentially.

use crate::application::dto::{ExtractionResult, ReportRecord};
use crate::domain::entities::Span;
use crate::domain::repositories::ArtifactWriter;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::time::Instant;

/// Progress callback for extraction: (current, total)
pub type ExtractionProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Output name for the `index`-th span in start order
pub fn artifact_name(index: usize, span: &Span) -> String {
    format!("file{}.{}", index, span.format().extension())
}

/// Builds report records sorted by start offset
///
/// The sort is stable, so spans sharing a start keep claim order. Digests
/// are computed in parallel.
pub fn build_records(image: &[u8], spans: &[Span]) -> Vec<ReportRecord> {
    let mut sorted = spans.to_vec();
    sorted.sort_by_key(Span::start);

    sorted
        .par_iter()
        .enumerate()
        .map(|(index, span)| {
            let content = span.slice(image).unwrap_or(&[]);
            ReportRecord {
                name: artifact_name(index, span),
                format: span.format(),
                start: span.start(),
                end: span.end(),
                size: span.size(),
                sha256: hex::encode(Sha256::digest(content)),
            }
        })
        .collect()
}

/// Writes carved files through an [`ArtifactWriter`]
pub struct ExtractFilesUseCase<W: ArtifactWriter> {
    writer: W,
}

impl<W: ArtifactWriter> ExtractFilesUseCase<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Writes every record's bytes, one file at a time
    ///
    /// A failed write is recorded and does not stop the remaining ones.
    pub fn execute(
        &self,
        image: &[u8],
        records: &[ReportRecord],
        progress_callback: Option<ExtractionProgressCallback>,
    ) -> ExtractionResult {
        let start_time = Instant::now();
        let total = records.len();
        let mut result = ExtractionResult::new(self.writer.output_dir().to_path_buf());

        tracing::info!(
            files = total,
            output = %self.writer.output_dir().display(),
            "starting extraction"
        );

        for (index, record) in records.iter().enumerate() {
            if let Some(ref callback) = progress_callback {
                callback(index + 1, total);
            }

            let Some(data) = Span::new(record.start, record.end, record.format)
                .and_then(|s| s.slice(image))
            else {
                result.add_error(format!("{}: span outside image", record.name));
                continue;
            };

            match self.writer.write(&record.name, data) {
                Ok(write_result) => {
                    tracing::debug!(
                        name = %record.name,
                        path = %write_result.saved_path.display(),
                        "wrote artifact"
                    );
                    result.add_written(write_result.saved_size);
                }
                Err(e) => {
                    tracing::warn!(name = %record.name, error = %e, "failed to write artifact");
                    result.add_error(format!("Failed to write {}: {}", record.name, e));
                }
            }
        }

        result.duration = start_time.elapsed();

        tracing::info!(
            files = result.files_written,
            errors = result.errors.len(),
            "extraction complete in {:.2}s",
            result.duration.as_secs_f64()
        );

        result
    }
}
