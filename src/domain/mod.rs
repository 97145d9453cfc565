//! Domain layer - carving logic
//!
//! Entities, the image and writer traits, and the services that scan and
//! reconcile. Nothing here touches the filesystem.

pub mod entities;
pub mod repositories;
pub mod services;
