//! Span reconciler
//!
//! Turns raw header and trailer offsets into file spans. Formats are resolved
//! one at a time, least ambiguous first (fewest headers), and every span they
//! claim constrains the formats that follow.

use crate::domain::entities::{FormatKey, ScanResult};
use crate::domain::services::{
    Deadline, PairingContext, PairingStrategy, SectorAlignment, SpanRegistry,
};
use crate::error::Result;

/// Resolves scan results into a span registry
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanReconciler {
    alignment: SectorAlignment,
    deadline: Deadline,
}

impl SpanReconciler {
    pub fn new(alignment: SectorAlignment, deadline: Deadline) -> Self {
        Self { alignment, deadline }
    }

    /// Order in which formats are resolved: ascending header count, ties in
    /// catalog order
    pub fn resolution_order(headers: &ScanResult) -> Vec<FormatKey> {
        let mut order: Vec<FormatKey> = Vec::new();
        for count in headers.sorted_counts() {
            if !order.contains(&count.format) {
                order.push(count.format);
            }
        }
        order
    }

    /// Runs every format's pairing strategy in resolution order
    pub fn reconcile(
        &self,
        image: &[u8],
        headers: &ScanResult,
        trailers: &ScanResult,
    ) -> Result<SpanRegistry> {
        let mut registry = SpanRegistry::new();

        for format in Self::resolution_order(headers) {
            self.deadline.check("span reconciliation")?;

            let mut header_pool = headers.pool(format);
            let mut trailer_pool = trailers.pool(format);
            registry.retain_unclaimed(&mut header_pool);
            registry.retain_unclaimed(&mut trailer_pool);

            let strategy = PairingStrategy::for_format(format);
            let ctx = PairingContext {
                image,
                format,
                headers: header_pool,
                trailers: trailer_pool,
                alignment: self.alignment,
                deadline: self.deadline,
            };

            let claimed = strategy.resolve(&ctx, &mut registry)?;
            tracing::debug!(
                %format,
                ?strategy,
                headers = ctx.headers.len(),
                trailers = ctx.trailers.len(),
                claimed,
                "resolved format"
            );
        }

        Ok(registry)
    }
}
