#![no_main]

use libfuzzer_sys::fuzz_target;

use sigcarve::application::build_records;
use sigcarve::domain::services::RegionStart;
use sigcarve::{CarveImageUseCase, ScanOptions};

// Whole pipeline on arbitrary images: spans stay in bounds, never overlap
// under the default policy, and the report is sorted.
fuzz_target!(|data: &[u8]| {
    let options = ScanOptions::new()
        .with_region(RegionStart::Absolute(0))
        .sequential();
    let outcome = CarveImageUseCase::default()
        .carve_spans(data, &options)
        .unwrap();

    for (i, a) in outcome.spans.iter().enumerate() {
        assert!(a.start() < a.end() && a.end() as usize <= data.len());
        for b in &outcome.spans[i + 1..] {
            assert!(!a.overlaps(b));
        }
    }

    let records = build_records(data, &outcome.spans);
    assert!(records.windows(2).all(|w| w[0].start <= w[1].start));
});
