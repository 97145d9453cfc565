//! Application layer
//!
//! Use cases that drive the domain services over a disk image.

mod carve_image;
pub mod dto;
mod recover_files;

pub use carve_image::{CarveImageUseCase, CarveOutcome};
pub use recover_files::{
    ExtractFilesUseCase, ExtractionProgressCallback, artifact_name, build_records,
};
