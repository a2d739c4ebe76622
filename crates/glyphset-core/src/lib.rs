//! glyphset core - labeled image dataset preparation.
//!
//! Takes a flat directory of labeled images (the label is the first character
//! of each filename, e.g. `5_1234.png`) and turns it into a classifier-ready
//! tree:
//!
//! ```text
//! source/*.png → Normalize (24×24, min-max) → Bucketize (dest/<label>/) → Renumber (<label>_<i>.png)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use glyphset_core::{Config, DatasetPipeline};
//!
//! #[tokio::main]
//! async fn main() -> glyphset_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = DatasetPipeline::new(&config);
//!
//!     let report = pipeline.run("./mnist_images".as_ref(), "./mnist_prepared".as_ref()).await?;
//!     println!("Wrote {} images", report.normalize.written);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::{expand_path, Config};
pub use error::{ConfigError, GlyphsetError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    bucketize, inspect, renumber, Bucketizer, DatasetPipeline, DatasetSummary, DiscoveredFile,
    Normalizer, Renamer,
};
pub use types::{
    BucketReport, FileFailure, FileMove, ImageRecord, Label, NormalizeReport, PipelineReport,
    RenameReport, StageReport,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
