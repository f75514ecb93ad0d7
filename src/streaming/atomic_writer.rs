//! Atomic CSV part-file writer.
//!
//! Writes to a temporary file in the same directory as the destination,
//! then atomically replaces the destination on `finish()`. If dropped
//! before finishing, the temporary file is automatically cleaned up.

use std::fs::{self, Permissions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Writer};
use tempfile::NamedTempFile;

use crate::error::SplitError;

/// An atomic CSV writer for a single output part.
///
/// A destination that already exists is replaced without warning once
/// `finish()` succeeds. Until then it is left untouched. The replacement
/// keeps the destination's permissions.
pub struct AtomicCsvWriter {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
    permissions: Option<Permissions>,
    rows_written: u64,
}

impl AtomicCsvWriter {
    /// Creates a new atomic CSV writer targeting the specified path.
    ///
    /// The temporary file is created in the same directory as `final_path`
    /// so the final rename stays on one filesystem.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::OperationFailed` if the parent directory cannot
    /// be determined or the temporary file cannot be created.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self, SplitError> {
        let final_path = final_path.as_ref().to_path_buf();

        let parent_dir = match final_path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => {
                return Err(SplitError::OperationFailed(format!(
                    "Cannot determine parent directory for: {}",
                    final_path.display()
                )))
            }
        };

        let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| {
            SplitError::OperationFailed(format!("Failed to create temporary file: {}", e))
        })?;

        // Temp files are created owner-only; keep an existing file's mode.
        let permissions = fs::metadata(&final_path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.permissions());

        Ok(Self {
            writer: Writer::from_writer(BufWriter::new(temp_file)),
            final_path,
            permissions,
            rows_written: 0,
        })
    }

    /// Sets the permissions to give the file when the destination does not
    /// exist yet. An existing destination's permissions take precedence.
    pub fn fallback_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions.get_or_insert(permissions);
        self
    }

    /// Writes the header row.
    pub fn write_header(&mut self, headers: &ByteRecord) -> Result<(), SplitError> {
        self.writer.write_byte_record(headers).map_err(|e| {
            SplitError::OperationFailed(format!("Failed to write CSV header: {}", e))
        })
    }

    /// Writes one data row.
    pub fn write_row(&mut self, row: &ByteRecord) -> Result<(), SplitError> {
        self.writer.write_byte_record(row).map_err(|e| {
            SplitError::OperationFailed(format!("Failed to write CSV record: {}", e))
        })?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of data rows written so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flushes all buffers and atomically persists the file to the final path.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::OperationFailed` if flushing or persisting fails.
    /// On error, the temporary file is cleaned up automatically.
    pub fn finish(self) -> Result<PathBuf, SplitError> {
        let buf_writer = self.writer.into_inner().map_err(|e| {
            SplitError::OperationFailed(format!("Failed to flush CSV writer: {}", e.error()))
        })?;

        let named_temp = buf_writer.into_inner().map_err(|e| {
            SplitError::OperationFailed(format!("Failed to flush buffer: {}", e.error()))
        })?;

        if let Some(permissions) = self.permissions {
            named_temp
                .as_file()
                .set_permissions(permissions)
                .map_err(|e| {
                    SplitError::OperationFailed(format!(
                        "Failed to set permissions on {}: {}",
                        self.final_path.display(),
                        e
                    ))
                })?;
        }

        named_temp.persist(&self.final_path).map_err(|e| {
            SplitError::OperationFailed(format!(
                "Failed to persist file to {}: {}",
                self.final_path.display(),
                e.error
            ))
        })?;

        Ok(self.final_path)
    }
}
