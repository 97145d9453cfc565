//! Scanner and reconciliation property tests

use proptest::prelude::*;
use sigcarve::application::{CarveImageUseCase, build_records};
use sigcarve::domain::entities::Signature;
use sigcarve::domain::services::{
    Deadline, RegionStart, SectorAlignment, SignatureCatalog, SignatureScanner, SpanReconciler,
};
use sigcarve::{CarveError, ScanOptions};
use std::time::Duration;

/// Sequential non-overlapping search for one signature
fn naive_offsets(image: &[u8], sig: &Signature) -> Vec<u64> {
    let pattern = sig.pattern();
    let mut offsets = Vec::new();
    let mut pos = 0;

    while pos + pattern.len() <= image.len() {
        let Some(found) = image[pos..].windows(pattern.len()).position(|w| w == pattern) else {
            break;
        };
        let at = pos + found;
        if sig.accepts_follow_byte(image.get(at + pattern.len()).copied()) {
            offsets.push(at as u64);
        }
        pos = at + pattern.len();
    }
    offsets
}

/// Buffers stitched from random bytes and catalog patterns, so that matches
/// (including overlapping and truncated ones) are common
fn image_strategy() -> impl Strategy<Value = Vec<u8>> {
    let catalog = SignatureCatalog::standard();
    let patterns: Vec<Vec<u8>> = catalog
        .headers()
        .iter()
        .chain(catalog.trailers())
        .map(|s| s.pattern().to_vec())
        .chain([vec![0xB3], vec![0x00; 3]])
        .collect();

    let chunk = prop_oneof![
        3 => prop::collection::vec(any::<u8>(), 1..16),
        2 => prop::sample::select(patterns),
    ];
    prop::collection::vec(chunk, 0..120).prop_map(|chunks| chunks.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_scan_matches_naive_search(image in image_strategy()) {
        let catalog = SignatureCatalog::standard();
        for set in [catalog.headers(), catalog.trailers()] {
            let scanner = SignatureScanner::new(set).unwrap();
            let result = scanner.scan(&image, 0..image.len(), &Deadline::unlimited()).unwrap();

            for (sig, count) in set.iter().zip(result.counts()) {
                let found: Vec<u64> = result
                    .entries()
                    .iter()
                    .filter(|e| e.name == sig.name() && e.role == sig.role())
                    .map(|e| e.offset)
                    .collect();
                let expected = naive_offsets(&image, sig);
                prop_assert_eq!(count.count, expected.len());
                prop_assert_eq!(found, expected, "signature {}", sig.name());
            }
        }
    }

    #[test]
    fn prop_scan_is_idempotent(image in image_strategy(), start in 0usize..64) {
        let catalog = SignatureCatalog::standard();
        let scanner = SignatureScanner::new(catalog.trailers()).unwrap();
        let first = scanner.scan(&image, start..image.len(), &Deadline::unlimited()).unwrap();
        let second = scanner.scan(&image, start..image.len(), &Deadline::unlimited()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_matches_stay_inside_region(
        image in image_strategy(),
        start in 0usize..256,
        len in 0usize..512,
    ) {
        let catalog = SignatureCatalog::standard();
        let scanner = SignatureScanner::new(catalog.headers()).unwrap();
        let end = start + len;
        let result = scanner.scan(&image, start..end, &Deadline::unlimited()).unwrap();
        for entry in result.entries() {
            prop_assert!(entry.offset >= start as u64);
            prop_assert!(entry.end() <= end.min(image.len()) as u64);
        }
    }

    #[test]
    fn prop_spans_start_inside_region(image in image_strategy(), start in 1u64..256) {
        let options = ScanOptions::new()
            .with_region(RegionStart::Absolute(start))
            .with_sector_size(0);
        let outcome = CarveImageUseCase::default()
            .carve_spans(&image, &options)
            .unwrap();

        prop_assert_eq!(outcome.data_region, start);
        for entry in outcome
            .header_scan
            .entries()
            .iter()
            .chain(outcome.trailer_scan.entries())
        {
            prop_assert!(entry.offset >= start);
        }
        for span in outcome.spans.iter().chain(&outcome.rejected) {
            prop_assert!(span.start() >= start, "{:?} starts before {}", span, start);
            prop_assert!(span.end() <= image.len() as u64);
        }
    }

    #[test]
    fn prop_report_spans_are_valid(
        image in image_strategy(),
        sector_size in prop::sample::select(vec![0u64, 1, 512]),
    ) {
        let options = ScanOptions::new()
            .with_region(RegionStart::Absolute(0))
            .with_sector_size(sector_size);
        let outcome = CarveImageUseCase::default()
            .carve_spans(&image, &options)
            .unwrap();

        for span in &outcome.spans {
            prop_assert!(span.start() < span.end());
            prop_assert!(span.end() <= image.len() as u64);
        }
        for (i, a) in outcome.spans.iter().enumerate() {
            for b in &outcome.spans[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }

        let records = build_records(&image, &outcome.spans);
        prop_assert!(records.windows(2).all(|w| w[0].start <= w[1].start));
        for (i, record) in records.iter().enumerate() {
            let prefix = format!("file{}.", i);
            prop_assert!(record.name.starts_with(&prefix));
            prop_assert_eq!(record.size, record.end - record.start);
        }
    }
}

// ============================================================================
// Deadline
// ============================================================================

fn expired_deadline() -> Deadline {
    let deadline = Deadline::new(Some(Duration::ZERO));
    std::thread::sleep(Duration::from_millis(2));
    deadline
}

fn gif_image() -> Vec<u8> {
    let mut image = vec![0u8; 2048];
    image[512..518].copy_from_slice(b"GIF89a");
    image[800..803].copy_from_slice(&[0x00, 0x00, 0x3B]);
    image
}

#[test]
fn test_scan_stops_at_expired_deadline() {
    let image = gif_image();
    let catalog = SignatureCatalog::standard();
    let scanner = SignatureScanner::new(catalog.headers()).unwrap();

    let err = scanner.scan(&image, 0..image.len(), &expired_deadline()).unwrap_err();
    assert!(matches!(err, CarveError::DeadlineExceeded { phase: "signature scan", .. }));
}

#[test]
fn test_reconcile_stops_at_expired_deadline() {
    let image = gif_image();
    let catalog = SignatureCatalog::standard();
    let unlimited = Deadline::unlimited();
    let headers = SignatureScanner::new(catalog.headers())
        .unwrap()
        .scan(&image, 0..image.len(), &unlimited)
        .unwrap();
    let trailers = SignatureScanner::new(catalog.trailers())
        .unwrap()
        .scan(&image, 0..image.len(), &unlimited)
        .unwrap();

    let reconciler = SpanReconciler::new(SectorAlignment::default(), expired_deadline());
    let err = reconciler.reconcile(&image, &headers, &trailers).unwrap_err();
    assert!(matches!(
        err,
        CarveError::DeadlineExceeded { phase: "span reconciliation", .. }
    ));

    let registry = SpanReconciler::default()
        .reconcile(&image, &headers, &trailers)
        .unwrap();
    assert_eq!(registry.len(), 1);
}
