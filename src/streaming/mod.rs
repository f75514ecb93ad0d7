//! Writing part files.
//!
//! This module splits a loaded dataset into contiguous row chunks and writes
//! each chunk row by row through an atomic writer, so a part file only
//! appears once it is complete.

mod atomic_writer;
mod csv_chunker;

pub use atomic_writer::AtomicCsvWriter;
pub use csv_chunker::{
    output_path_for, split_file, PlannedChunk, SplitConfig, SplitResult, Splitter,
    DEFAULT_NUM_SPLITS,
};
