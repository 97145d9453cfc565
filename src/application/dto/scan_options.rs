//! Scan options DTO

use crate::domain::entities::FormatKey;
use crate::domain::services::{DEFAULT_SECTOR_SIZE, OverlapPolicy, RegionStart};
use std::time::Duration;

/// Options for carving an image
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Formats to carve (empty = all)
    pub formats: Vec<FormatKey>,
    /// Where the search region starts
    pub region: RegionStart,
    /// Alignment required of bitmap, photo and stream headers (0 disables)
    pub sector_size: u64,
    /// Handling of spans that overlap after reconciliation
    pub overlap_policy: OverlapPolicy,
    /// Wall-clock budget for scanning plus reconciliation
    pub deadline: Option<Duration>,
    /// Largest image accepted, in bytes
    pub max_image_bytes: Option<u64>,
    /// Extension the image path must carry (`None` accepts any)
    pub required_extension: Option<String>,
    /// Whether the header and trailer passes run concurrently
    pub parallel_scan: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            formats: Vec::new(), // All formats
            region: RegionStart::BootSector,
            sector_size: DEFAULT_SECTOR_SIZE,
            overlap_policy: OverlapPolicy::Reject,
            deadline: None,
            max_image_bytes: None,
            required_extension: Some("dd".to_string()),
            parallel_scan: true,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the formats to carve
    pub fn with_formats(mut self, formats: Vec<FormatKey>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_region(mut self, region: RegionStart) -> Self {
        self.region = region;
        self
    }

    pub fn with_sector_size(mut self, sector_size: u64) -> Self {
        self.sector_size = sector_size;
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    /// Sets the size limit in mebibytes
    pub fn with_max_image_mb(mut self, megabytes: u64) -> Self {
        self.max_image_bytes = Some(megabytes.saturating_mul(1024 * 1024));
        self
    }

    /// Accepts images with any extension
    pub fn any_extension(mut self) -> Self {
        self.required_extension = None;
        self
    }

    /// Runs the two scan passes one after the other
    pub fn sequential(mut self) -> Self {
        self.parallel_scan = false;
        self
    }
}
