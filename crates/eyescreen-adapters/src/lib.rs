//! eyescreen adapters - the outside world for the screening pipeline.
//!
//! This crate provides adapters for:
//! - Filesystem image source (JPEG, PNG)
//! - EXIF orientation and the crop collaborator
//! - Model artifact catalog

pub mod crop;
pub mod fs;
pub mod models;
pub mod orientation;

pub use crop::{check_model_aspect, crop, parse_crop};
pub use fs::FsImageSource;
pub use models::{models_dir, ModelCatalog, ModelStatus};
pub use orientation::decode_oriented;
