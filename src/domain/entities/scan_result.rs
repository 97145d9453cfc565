//! Scan result entity
//!
//! Offsets and per-signature counts produced by one scanner pass.

use super::file_signature::{FormatKey, Signature, SignatureRole};
use serde::Serialize;

/// One accepted occurrence of a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetEntry {
    pub format: FormatKey,
    pub role: SignatureRole,
    /// Catalog key of the matching signature (`pdf2` for a PDF trailer variant)
    pub name: &'static str,
    pub offset: u64,
    /// Length of the matched pattern
    pub len: usize,
}

impl OffsetEntry {
    /// Offset one past the matched pattern
    pub fn end(&self) -> u64 {
        self.offset + self.len as u64
    }
}

/// Number of accepted occurrences of one signature, zero included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub format: FormatKey,
    pub role: SignatureRole,
    pub name: &'static str,
    pub count: usize,
}

/// Output of a scanner pass
///
/// Entries are grouped per signature in catalog order and ascending by
/// offset within each group. Counts keep catalog order; use
/// [`ScanResult::sorted_counts`] for the reconciliation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    entries: Vec<OffsetEntry>,
    counts: Vec<CountEntry>,
}

impl ScanResult {
    /// Builds a result from per-signature offset lists (same order as `signatures`)
    pub fn from_groups(signatures: &[Signature], groups: Vec<Vec<u64>>) -> Self {
        let mut entries = Vec::with_capacity(groups.iter().map(Vec::len).sum());
        let mut counts = Vec::with_capacity(signatures.len());

        for (sig, offsets) in signatures.iter().zip(groups) {
            counts.push(CountEntry {
                format: sig.format(),
                role: sig.role(),
                name: sig.name(),
                count: offsets.len(),
            });
            entries.extend(offsets.into_iter().map(|offset| OffsetEntry {
                format: sig.format(),
                role: sig.role(),
                name: sig.name(),
                offset,
                len: sig.len(),
            }));
        }

        Self { entries, counts }
    }

    pub fn entries(&self) -> &[OffsetEntry] {
        &self.entries
    }

    pub fn counts(&self) -> &[CountEntry] {
        &self.counts
    }

    /// Counts sorted ascending; ties keep catalog order
    pub fn sorted_counts(&self) -> Vec<CountEntry> {
        let mut sorted = self.counts.clone();
        sorted.sort_by_key(|c| c.count);
        sorted
    }

    /// Total accepted occurrences across every signature of `format`
    pub fn count_for_format(&self, format: FormatKey) -> usize {
        self.counts
            .iter()
            .filter(|c| c.format == format)
            .map(|c| c.count)
            .sum()
    }

    /// Candidate pool for `format` in reverse discovery order
    ///
    /// Each signature group is reversed (latest match first); groups keep
    /// catalog order, so variant trailers follow the base trailer.
    pub fn pool(&self, format: FormatKey) -> Vec<OffsetEntry> {
        let mut pool = Vec::with_capacity(self.count_for_format(format));
        for count in self.counts.iter().filter(|c| c.format == format) {
            pool.extend(
                self.entries
                    .iter()
                    .rev()
                    .filter(|e| e.name == count.name && e.format == format),
            );
        }
        pool
    }

    pub fn total_matches(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PDF: Signature = Signature::trailer(FormatKey::Pdf, "pdf", b"\n%%EOF");
    static PDF2: Signature = Signature::trailer(FormatKey::Pdf, "pdf2", b"\n%%EOF\n");
    static GIF: Signature = Signature::trailer(FormatKey::Gif, "gif", &[0x00, 0x00, 0x3B]);

    #[test]
    fn test_pool_reverses_each_group() {
        let result = ScanResult::from_groups(
            &[PDF, GIF, PDF2],
            vec![vec![10, 50], vec![7], vec![30, 90]],
        );
        let pool: Vec<_> = result
            .pool(FormatKey::Pdf)
            .iter()
            .map(|e| (e.name, e.offset))
            .collect();
        assert_eq!(pool, vec![("pdf", 50), ("pdf", 10), ("pdf2", 90), ("pdf2", 30)]);
        assert_eq!(result.count_for_format(FormatKey::Pdf), 4);
    }

    #[test]
    fn test_sorted_counts_are_stable() {
        let result = ScanResult::from_groups(&[PDF, GIF, PDF2], vec![vec![1], vec![], vec![2]]);
        let names: Vec<_> = result.sorted_counts().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["gif", "pdf", "pdf2"]);
    }

    #[test]
    fn test_entry_end_adds_pattern_length() {
        let result = ScanResult::from_groups(&[PDF2], vec![vec![100]]);
        assert_eq!(result.entries()[0].end(), 107);
    }
}
