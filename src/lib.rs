//! Signature-based file carving for raw disk images.
//!
//! The crate is layered: [`domain`] holds the catalog, scanner and span
//! reconciler, [`application`] drives them over an image, [`infrastructure`]
//! provides the memory-mapped image and the artifact writer, and
//! [`presentation`] is the command-line front end.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

pub use application::dto::{CarveReport, ReportRecord, ScanOptions};
pub use application::{CarveImageUseCase, CarveOutcome, ExtractFilesUseCase};
pub use domain::entities::{FormatKey, ScanResult, Signature, SignatureRole, Span};
pub use domain::services::{OverlapPolicy, RegionStart, SignatureCatalog};
pub use error::{CarveError, Result};
