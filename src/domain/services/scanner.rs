//! Signature scanner
//!
//! Finds every occurrence of a set of signatures inside a region of the
//! image. A single Aho-Corasick pass reports all pattern hits; a cursor per
//! signature then drops hits that overlap the previous one of the same
//! pattern, which reproduces a sequential non-overlapping search per
//! signature.

use crate::domain::entities::{ScanResult, Signature};
use crate::domain::services::Deadline;
use crate::error::{CarveError, Result};
use aho_corasick::{AhoCorasick, Input};
use std::ops::Range;

/// Raw automaton hits processed between deadline checks
const DEADLINE_CHECK_INTERVAL: usize = 1 << 16;

/// Scanner over a fixed subset of the signature catalog
#[derive(Debug, Clone)]
pub struct SignatureScanner {
    signatures: Vec<Signature>,
    pattern_matcher: Option<AhoCorasick>,
}

impl SignatureScanner {
    /// Builds the automaton for `signatures`
    pub fn new(signatures: &[Signature]) -> Result<Self> {
        let pattern_matcher = if signatures.is_empty() {
            None
        } else {
            let patterns: Vec<&[u8]> = signatures.iter().map(|s| s.pattern()).collect();
            Some(AhoCorasick::new(patterns).map_err(|e| CarveError::Matcher(e.to_string()))?)
        };

        Ok(Self {
            signatures: signatures.to_vec(),
            pattern_matcher,
        })
    }

    /// Scans `image[region]` and returns offsets and per-signature counts
    ///
    /// The region is clamped to the image. A match must lie entirely inside
    /// it; the follow byte of a disambiguated signature may sit just past it.
    pub fn scan(
        &self,
        image: &[u8],
        region: Range<usize>,
        deadline: &Deadline,
    ) -> Result<ScanResult> {
        let end = region.end.min(image.len());
        let start = region.start.min(end);
        let mut groups: Vec<Vec<u64>> = vec![Vec::new(); self.signatures.len()];

        let Some(matcher) = &self.pattern_matcher else {
            return Ok(ScanResult::from_groups(&self.signatures, groups));
        };

        let mut next_allowed = vec![start; self.signatures.len()];
        let input = Input::new(image).range(start..end);

        // Overlapping hits arrive ordered by end position. Patterns have a
        // fixed length, so hits of one pattern also arrive ordered by start.
        for (seen, hit) in matcher.find_overlapping_iter(input).enumerate() {
            if seen % DEADLINE_CHECK_INTERVAL == 0 {
                deadline.check("signature scan")?;
            }

            let idx = hit.pattern().as_usize();
            if hit.start() < next_allowed[idx] {
                continue;
            }
            next_allowed[idx] = hit.end();

            let sig = &self.signatures[idx];
            if !sig.accepts_follow_byte(image.get(hit.end()).copied()) {
                continue;
            }
            groups[idx].push(hit.start() as u64);
        }

        let result = ScanResult::from_groups(&self.signatures, groups);
        for count in result.counts() {
            tracing::debug!(
                signature = count.name,
                role = %count.role,
                count = count.count,
                "signature occurrences"
            );
        }
        Ok(result)
    }
}
