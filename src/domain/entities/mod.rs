//! Domain entities
//!
//! Core business objects that represent the fundamental concepts
//! in the file carving domain.

mod file_signature;
mod scan_result;
mod span;

pub use file_signature::{FormatKey, Signature, SignatureRole};
pub use scan_result::{CountEntry, OffsetEntry, ScanResult};
pub use span::Span;
