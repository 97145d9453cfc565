#![no_main]

use libfuzzer_sys::fuzz_target;

use sigcarve::domain::services::{Deadline, SignatureCatalog, SignatureScanner};

// Byte 0..2 pick the region start; the rest is the image. Every accepted
// match must lie inside the region and repeat on a second pass.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let start = u16::from_le_bytes([data[0], data[1]]) as usize;
    let image = &data[2..];

    let catalog = SignatureCatalog::standard();
    for set in [catalog.headers(), catalog.trailers()] {
        let scanner = SignatureScanner::new(set).unwrap();
        let first = scanner.scan(image, start..image.len(), &Deadline::unlimited()).unwrap();
        let second = scanner.scan(image, start..image.len(), &Deadline::unlimited()).unwrap();
        assert_eq!(first, second);

        for entry in first.entries() {
            assert!(entry.offset as usize >= start);
            assert!(entry.end() as usize <= image.len());
            let at = entry.offset as usize;
            let sig = set.iter().find(|s| s.name() == entry.name).unwrap();
            assert_eq!(&image[at..at + entry.len], sig.pattern());
        }
    }
});
