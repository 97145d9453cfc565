//! Carve image use case
//!
//! Orchestrates one carving run: locate the data region, scan for headers
//! and trailers, reconcile candidates into spans and report them.

use crate::application::dto::{CarveReport, ScanOptions};
use crate::application::recover_files::build_records;
use crate::domain::entities::{ScanResult, Span};
use crate::domain::repositories::DiskImage;
use crate::domain::services::{
    Deadline, SectorAlignment, SignatureCatalog, SignatureScanner, SpanReconciler,
    resolve_region_start,
};
use crate::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Spans and intermediate results of one run, before digesting
#[derive(Debug, Clone)]
pub struct CarveOutcome {
    pub data_region: u64,
    pub header_scan: ScanResult,
    pub trailer_scan: ScanResult,
    /// Spans surviving the overlap pass, in claim order
    pub spans: Vec<Span>,
    /// Spans dropped by the overlap pass
    pub rejected: Vec<Span>,
    pub duration: Duration,
}

/// Carve image use case
pub struct CarveImageUseCase {
    catalog: Arc<SignatureCatalog>,
}

impl CarveImageUseCase {
    pub fn new(catalog: Arc<SignatureCatalog>) -> Self {
        Self { catalog }
    }

    /// Creates with the standard signature catalog
    pub fn with_standard_catalog() -> Self {
        Self::new(Arc::new(SignatureCatalog::standard()))
    }

    /// Scans and reconciles `image` into spans
    pub fn carve_spans(&self, image: &[u8], options: &ScanOptions) -> Result<CarveOutcome> {
        let start_time = Instant::now();
        let deadline = Deadline::new(options.deadline);

        let mut catalog = self.catalog.as_ref().clone();
        if !options.formats.is_empty() {
            catalog = catalog.restrict(&options.formats);
        }

        let data_region = resolve_region_start(image, options.region);
        let region_start = usize::try_from(data_region).unwrap_or(usize::MAX);
        let region = region_start..image.len();

        tracing::info!(
            image_size = image.len(),
            data_region,
            signatures = catalog.signature_count(),
            "starting scan"
        );

        let header_scanner = SignatureScanner::new(catalog.headers())?;
        let trailer_scanner = SignatureScanner::new(catalog.trailers())?;

        let (header_scan, trailer_scan) = if options.parallel_scan {
            rayon::join(
                || header_scanner.scan(image, region.clone(), &deadline),
                || trailer_scanner.scan(image, region.clone(), &deadline),
            )
        } else {
            (
                header_scanner.scan(image, region.clone(), &deadline),
                trailer_scanner.scan(image, region.clone(), &deadline),
            )
        };
        let (header_scan, trailer_scan) = (header_scan?, trailer_scan?);

        tracing::info!(
            headers = header_scan.total_matches(),
            trailers = trailer_scan.total_matches(),
            elapsed_ms = deadline.elapsed().as_millis() as u64,
            "scan complete"
        );

        let reconciler = SpanReconciler::new(SectorAlignment::new(options.sector_size), deadline);
        let registry = reconciler.reconcile(image, &header_scan, &trailer_scan)?;
        let (spans, rejected) = registry.resolve_overlaps(options.overlap_policy);

        let duration = start_time.elapsed();
        tracing::info!(
            spans = spans.len(),
            rejected = rejected.len(),
            "reconciliation complete in {:.2}s",
            duration.as_secs_f64()
        );

        Ok(CarveOutcome {
            data_region,
            header_scan,
            trailer_scan,
            spans,
            rejected,
            duration,
        })
    }

    /// Carves `image` and builds the full report
    pub fn execute<I: DiskImage + ?Sized>(
        &self,
        image: &I,
        options: &ScanOptions,
    ) -> Result<CarveReport> {
        let bytes = image.bytes();
        let outcome = self.carve_spans(bytes, options)?;
        let records = build_records(bytes, &outcome.spans);

        Ok(CarveReport {
            source_path: image.path().to_string(),
            image_size: image.size(),
            data_region: outcome.data_region,
            header_counts: outcome.header_scan.counts().to_vec(),
            trailer_counts: outcome.trailer_scan.counts().to_vec(),
            records,
            rejected: outcome.rejected,
            duration: outcome.duration,
        })
    }
}

impl Default for CarveImageUseCase {
    fn default() -> Self {
        Self::with_standard_catalog()
    }
}
