//! Span registry
//!
//! Append-only record of spans claimed so far. The reconciler consults it to
//! keep later, more ambiguous formats from reusing bytes of files already
//! resolved.

use crate::domain::entities::{OffsetEntry, Span};

/// What to do with spans that overlap after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Keep spans in claim order, dropping any that overlaps a kept one
    #[default]
    Reject,
    /// Report the registry as claimed
    Allow,
}

/// Claimed spans in claim order
#[derive(Debug, Clone, Default)]
pub struct SpanRegistry {
    spans: Vec<Span>,
}

impl SpanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a span. Claims are never rolled back.
    pub fn claim(&mut self, span: Span) {
        tracing::debug!(
            format = %span.format(),
            start = span.start(),
            end = span.end(),
            "claimed span"
        );
        self.spans.push(span);
    }

    /// Membership rule: `offset` lies strictly inside some claimed span
    pub fn contains_strictly(&self, offset: u64) -> bool {
        self.spans.iter().any(|s| s.contains_strictly(offset))
    }

    /// Separation rule: a claimed span starts strictly between `target` and `end`
    pub fn separates(&self, target: u64, end: u64) -> bool {
        self.spans.iter().any(|s| s.start() > target && s.start() < end)
    }

    /// Drops candidates that fall inside a claimed span
    pub fn retain_unclaimed(&self, pool: &mut Vec<OffsetEntry>) {
        if !self.spans.is_empty() {
            pool.retain(|entry| !self.contains_strictly(entry.offset));
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Every claimed span, in claim order
    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }

    /// Applies `policy` and returns `(kept, rejected)`, both in claim order
    pub fn resolve_overlaps(self, policy: OverlapPolicy) -> (Vec<Span>, Vec<Span>) {
        if policy == OverlapPolicy::Allow {
            return (self.into_spans(), Vec::new());
        }

        let mut kept: Vec<Span> = Vec::with_capacity(self.spans.len());
        let mut rejected = Vec::new();

        for span in self.spans {
            match kept.iter().find(|k| k.overlaps(&span)) {
                Some(winner) => {
                    tracing::warn!(
                        format = %span.format(),
                        start = span.start(),
                        end = span.end(),
                        winner_format = %winner.format(),
                        winner_start = winner.start(),
                        "dropping span overlapping an earlier claim"
                    );
                    rejected.push(span);
                }
                None => kept.push(span),
            }
        }

        (kept, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FormatKey, SignatureRole};

    fn span(start: u64, end: u64) -> Span {
        Span::new(start, end, FormatKey::Gif).unwrap()
    }

    fn entry(offset: u64) -> OffsetEntry {
        OffsetEntry {
            format: FormatKey::Png,
            role: SignatureRole::Header,
            name: "png",
            offset,
            len: 8,
        }
    }

    #[test]
    fn test_membership_uses_open_interval() {
        let mut registry = SpanRegistry::new();
        registry.claim(span(100, 200));
        registry.claim(span(500, 600));

        assert!(!registry.contains_strictly(100));
        assert!(registry.contains_strictly(199));
        assert!(!registry.contains_strictly(200));
        // Every span is consulted, not only the first
        assert!(registry.contains_strictly(550));
    }

    #[test]
    fn test_separation() {
        let mut registry = SpanRegistry::new();
        registry.claim(span(1000, 1100));

        assert!(registry.separates(500, 1500));
        assert!(!registry.separates(500, 1000));
        assert!(!registry.separates(1000, 1500));
        assert!(!registry.separates(1050, 1500));
    }

    #[test]
    fn test_retain_unclaimed() {
        let mut registry = SpanRegistry::new();
        registry.claim(span(100, 200));
        let mut pool = vec![entry(50), entry(100), entry(150), entry(199), entry(200)];
        registry.retain_unclaimed(&mut pool);
        let offsets: Vec<_> = pool.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![50, 100, 200]);
    }

    #[test]
    fn test_resolve_overlaps_keeps_first_claim() {
        let mut registry = SpanRegistry::new();
        registry.claim(span(0, 100));
        registry.claim(span(100, 150));
        registry.claim(span(50, 120));
        registry.claim(span(0, 100));

        let (kept, rejected) = registry.clone().resolve_overlaps(OverlapPolicy::Reject);
        assert_eq!(kept, vec![span(0, 100), span(100, 150)]);
        assert_eq!(rejected, vec![span(50, 120), span(0, 100)]);

        let (all, none) = registry.resolve_overlaps(OverlapPolicy::Allow);
        assert_eq!(all.len(), 4);
        assert!(none.is_empty());
    }
}
