//! Split a CSV file into N roughly equal, contiguous row chunks.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let parts = csv_splitter::split_file(Path::new("sales.csv"), 3)?;
//! for part in &parts {
//!     println!("- {}", part.display());
//! }
//! # Ok::<(), csv_splitter::SplitError>(())
//! ```

pub mod dataset;
pub mod error;
pub mod partition;
pub mod streaming;

pub use dataset::{CsvLoader, Dataset, DatasetLoader};
pub use error::{ErrorPresentation, SplitError, SplitErrorKind};
pub use partition::PartitionPlan;
pub use streaming::{
    output_path_for, split_file, AtomicCsvWriter, PlannedChunk, SplitConfig, SplitResult,
    Splitter, DEFAULT_NUM_SPLITS,
};
