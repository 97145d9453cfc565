//! Domain services
//!
//! Scanning, region location and span reconciliation over an in-memory image.

mod deadline;
mod pairing;
mod reconciler;
mod region_locator;
mod scanner;
mod signature_registry;
mod span_registry;

pub use deadline::Deadline;
pub use pairing::{DEFAULT_SECTOR_SIZE, PairingContext, PairingStrategy, SectorAlignment};
pub use reconciler::SpanReconciler;
pub use region_locator::{
    BOOT_SECTOR_FIELDS_LEN, BootSectorGeometry, RegionStart, locate_data_region,
    resolve_region_start,
};
pub use scanner::SignatureScanner;
pub use signature_registry::SignatureCatalog;
pub use span_registry::{OverlapPolicy, SpanRegistry};
