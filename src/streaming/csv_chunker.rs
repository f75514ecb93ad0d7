//! Splits a CSV file into N contiguous part files.
//!
//! The whole input is loaded through a [`DatasetLoader`], its rows are
//! partitioned with [`PartitionPlan`], and each non-empty chunk is written as
//! `<stem>_part_<k>.csv` with the original header row.

use std::fs::{self, Permissions};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use csv::ByteRecord;
use serde::Serialize;

use crate::dataset::{CsvLoader, Dataset, DatasetLoader};
use crate::error::SplitError;
use crate::partition::PartitionPlan;
use crate::streaming::AtomicCsvWriter;

/// Split count used when none is given.
pub const DEFAULT_NUM_SPLITS: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for splitting.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Maximum number of part files to produce. Must be at least 1.
    pub num_splits: usize,
    /// Directory for the part files. `None` writes them next to the input.
    pub output_dir: Option<PathBuf>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            num_splits: DEFAULT_NUM_SPLITS,
            output_dir: None,
        }
    }
}

impl SplitConfig {
    /// Creates a SplitConfig producing at most `num_splits` parts.
    pub fn new(num_splits: usize) -> Self {
        Self {
            num_splits,
            ..Self::default()
        }
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// One part file the splitter will write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChunk {
    /// 1-based part number.
    pub part: usize,
    /// Destination of the part file.
    pub path: PathBuf,
    /// First data row (0-based, inclusive).
    pub start_row: usize,
    /// End data row (0-based, exclusive).
    pub end_row: usize,
}

impl PlannedChunk {
    /// Number of data rows in this chunk.
    pub fn rows(&self) -> usize {
        self.end_row - self.start_row
    }
}

/// Result of splitting a CSV file.
#[derive(Debug, Clone, Serialize)]
pub struct SplitResult {
    /// Paths to the generated part files, in part order.
    pub output_paths: Vec<PathBuf>,
    /// Total data rows processed (excluding headers).
    pub total_rows: u64,
    /// Number of data rows in each part (parallel to output_paths).
    pub rows_per_chunk: Vec<u64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Splits `input` into at most `num_splits` part files next to it.
///
/// Returns the paths of the created files in part order. A header-only
/// input produces no files and an empty list.
///
/// # Errors
///
/// * `SplitError::InvalidSplitCount` if `num_splits` is 0 (nothing is read).
/// * `SplitError::NotFound` if `input` does not exist.
/// * `SplitError::OperationFailed` for any other read, parse or write
///   failure. Parts finished before the failure are left in place.
pub fn split_file(input: &Path, num_splits: usize) -> Result<Vec<PathBuf>, SplitError> {
    Splitter::new(SplitConfig::new(num_splits))
        .run(input)
        .map(|result| result.output_paths)
}

/// Returns the path of part `part` (1-based) for `input`.
///
/// The name is the input's file name with its last extension replaced by
/// `_part_<part>.csv`. It goes in `output_dir` when given, otherwise next to
/// the input.
pub fn output_path_for(
    input: &Path,
    part: usize,
    output_dir: Option<&Path>,
) -> Result<PathBuf, SplitError> {
    let stem = input.file_stem().ok_or_else(|| {
        SplitError::OperationFailed(format!(
            "Cannot determine file name for: {}",
            input.display()
        ))
    })?;

    let mut file_name = stem.to_os_string();
    file_name.push(format!("_part_{}.csv", part));

    Ok(match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    })
}

/// Splits CSV files according to a [`SplitConfig`].
#[derive(Debug, Clone)]
pub struct Splitter<L = CsvLoader> {
    loader: L,
    config: SplitConfig,
}

impl Splitter<CsvLoader> {
    /// Creates a splitter that reads whole CSV files from disk.
    pub fn new(config: SplitConfig) -> Self {
        Self::with_loader(CsvLoader, config)
    }
}

impl<L: DatasetLoader> Splitter<L> {
    /// Creates a splitter that loads its input through `loader`.
    pub fn with_loader(loader: L, config: SplitConfig) -> Self {
        Self { loader, config }
    }

    /// Loads `input` and returns the parts that `run` would write, without
    /// writing anything.
    pub fn plan(&self, input: &Path) -> Result<Vec<PlannedChunk>, SplitError> {
        let num_splits = self.validated_num_splits()?;
        let dataset = self.loader.load(input)?;
        self.plan_for(input, &dataset, num_splits)
    }

    /// Splits `input` into part files.
    ///
    /// Each part is written atomically and replaces any existing file of the
    /// same name, keeping that file's permissions. New parts get the input's
    /// permissions. A failure stops the run; parts already written stay.
    pub fn run(&self, input: &Path) -> Result<SplitResult, SplitError> {
        let result = self.run_inner(input);

        if let Err(ref e) = result {
            tracing::warn!(source = %input.display(), error = %e, "CSV split failed");
        }

        result
    }

    fn run_inner(&self, input: &Path) -> Result<SplitResult, SplitError> {
        let num_splits = self.validated_num_splits()?;

        tracing::info!(
            source = %input.display(),
            num_splits = num_splits.get(),
            "Starting CSV split"
        );

        let dataset = self.loader.load(input)?;
        let chunks = self.plan_for(input, &dataset, num_splits)?;
        let input_permissions = fs::metadata(input).ok().map(|m| m.permissions());

        let mut output_paths = Vec::with_capacity(chunks.len());
        let mut rows_per_chunk = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let rows = dataset.slice(chunk.start_row..chunk.end_row);
            let (path, rows_written) = write_chunk(
                &chunk.path,
                dataset.headers(),
                rows,
                input_permissions.clone(),
            )?;

            tracing::debug!(
                part = chunk.part,
                rows = rows_written,
                path = %path.display(),
                "Wrote part file"
            );

            output_paths.push(path);
            rows_per_chunk.push(rows_written);
        }

        tracing::info!(
            total_rows = dataset.len(),
            part_count = output_paths.len(),
            "CSV split complete"
        );

        Ok(SplitResult {
            output_paths,
            total_rows: dataset.len() as u64,
            rows_per_chunk,
        })
    }

    fn validated_num_splits(&self) -> Result<NonZeroUsize, SplitError> {
        NonZeroUsize::new(self.config.num_splits).ok_or(SplitError::InvalidSplitCount {
            requested: self.config.num_splits,
        })
    }

    fn plan_for(
        &self,
        input: &Path,
        dataset: &Dataset,
        num_splits: NonZeroUsize,
    ) -> Result<Vec<PlannedChunk>, SplitError> {
        let output_dir = self.config.output_dir.as_deref();
        let plan = PartitionPlan::new(dataset.len(), num_splits);

        tracing::debug!(
            total_rows = plan.total_rows(),
            num_splits = plan.num_splits(),
            rows_per_chunk = plan.rows_per_chunk(),
            "Computed partition plan"
        );

        let mut chunks = Vec::with_capacity(plan.chunk_count());
        for (index, range) in plan.ranges().enumerate() {
            let part = index + 1;
            chunks.push(PlannedChunk {
                part,
                path: output_path_for(input, part, output_dir)?,
                start_row: range.start,
                end_row: range.end,
            });
        }
        Ok(chunks)
    }
}

/// Writes the header and `rows` to `path`, replacing any existing file.
///
/// Returns the written path and its data row count.
fn write_chunk(
    path: &Path,
    headers: &ByteRecord,
    rows: &[ByteRecord],
    permissions: Option<Permissions>,
) -> Result<(PathBuf, u64), SplitError> {
    let mut writer = AtomicCsvWriter::new(path)?;
    if let Some(permissions) = permissions {
        writer = writer.fallback_permissions(permissions);
    }

    writer.write_header(headers)?;
    for row in rows {
        writer.write_row(row)?;
    }

    let rows_written = writer.rows_written();
    Ok((writer.finish()?, rows_written))
}
