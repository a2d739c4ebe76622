//! Dataset preparation pipeline components.
//!
//! - **discovery**: Find source images in a flat directory
//! - **validate**: Size and signature checks before decoding
//! - **decode**: Load and decode images with a timeout
//! - **normalize**: Resize to 24×24 and min-max stretch
//! - **bucket**: Move files into per-label subdirectories
//! - **rename**: Renumber files per directory
//! - **inspect**: Check a prepared tree
//! - **snapshot**: Sorted directory listings taken before mutation
//! - **processor**: Runs the stages in order

pub mod bucket;
pub mod decode;
pub mod discovery;
pub mod inspect;
pub mod normalize;
pub mod processor;
pub mod rename;
pub mod snapshot;
pub mod validate;

// Re-exports for convenient access
pub use bucket::{bucketize, BucketMove, BucketPlan, Bucketizer};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use inspect::{inspect, DatasetSummary, LabelCount, LayoutIssue};
pub use normalize::{normalize_pixels, Normalizer, RESAMPLE_FILTER, TARGET_SIZE};
pub use processor::DatasetPipeline;
pub use rename::{renumber, DirPlan, Renamer};
pub use snapshot::DirSnapshot;
pub use validate::Validator;
