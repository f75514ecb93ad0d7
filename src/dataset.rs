//! In-memory tabular dataset and the loaders that produce it.
//!
//! Records are held as raw `ByteRecord`s so field contents pass through to
//! the output files byte-for-byte, whatever their encoding.

use std::fs::File;
use std::io::{self, BufReader};
use std::ops::Range;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};

use crate::error::SplitError;

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ─────────────────────────────────────────────────────────────────────────────
// Dataset
// ─────────────────────────────────────────────────────────────────────────────

/// A header row plus the ordered data rows beneath it.
///
/// Every row has exactly as many fields as the header.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: ByteRecord,
    rows: Vec<ByteRecord>,
}

impl Dataset {
    /// Builds a dataset, rejecting rows whose width differs from the header.
    pub fn new(headers: ByteRecord, rows: Vec<ByteRecord>) -> Result<Self, SplitError> {
        if headers.is_empty() {
            return Err(SplitError::OperationFailed(
                "CSV file has no header row".to_string(),
            ));
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(SplitError::OperationFailed(format!(
                "Row {} has {} fields, expected {}",
                index + 1,
                row.len(),
                headers.len()
            )));
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &ByteRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[ByteRecord] {
        &self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrows the rows in `range` without copying them.
    pub fn slice(&self, range: Range<usize>) -> &[ByteRecord] {
        &self.rows[range]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loaders
// ─────────────────────────────────────────────────────────────────────────────

/// Source of the dataset to split.
///
/// The splitter only depends on this trait, so a loader that reads lazily
/// can replace the whole-file one without touching the partition logic.
pub trait DatasetLoader {
    /// Loads the dataset stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::NotFound` if `path` does not exist and
    /// `SplitError::OperationFailed` for any other read or parse failure.
    fn load(&self, path: &Path) -> Result<Dataset, SplitError>;
}

/// Reads a whole comma-delimited file with a header row into memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLoader;

impl DatasetLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Dataset, SplitError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SplitError::NotFound {
                path: path.to_path_buf(),
            },
            _ => SplitError::OperationFailed(format!("Failed to open source file: {}", e)),
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(BufReader::new(file));

        let headers = reader.byte_headers().map_err(|e| {
            SplitError::OperationFailed(format!("Failed to read CSV headers: {}", e))
        })?;
        let headers = strip_bom(headers);

        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = result.map_err(|e| {
                SplitError::OperationFailed(format!("Failed to read CSV record: {}", e))
            })?;
            rows.push(record);
        }

        tracing::debug!(
            source = %path.display(),
            columns = headers.len(),
            rows = rows.len(),
            "Loaded CSV dataset"
        );

        Dataset::new(headers, rows)
    }
}

/// Returns the header record with any leading UTF-8 BOM removed from its
/// first field.
fn strip_bom(headers: &ByteRecord) -> ByteRecord {
    match headers.get(0) {
        Some(first) if first.starts_with(UTF8_BOM) => {
            let mut stripped =
                ByteRecord::with_capacity(headers.as_slice().len(), headers.len());
            stripped.push_field(&first[UTF8_BOM.len()..]);
            for field in headers.iter().skip(1) {
                stripped.push_field(field);
            }
            stripped
        }
        _ => headers.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitErrorKind;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_csv(dir: &TempDir, content: &[u8]) -> PathBuf {
        let path = dir.path().join("input.csv");
        fs::write(&path, content).expect("Failed to write test CSV");
        path
    }

    fn fields(record: &ByteRecord) -> Vec<String> {
        record
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    #[test]
    fn test_loads_header_and_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(&dir, b"Id,Name\n1,Alice\n2,Bob\n3,Charlie\n");

        let dataset = CsvLoader.load(&path).expect("load failed");

        assert_eq!(fields(dataset.headers()), vec!["Id", "Name"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(fields(&dataset.rows()[0]), vec!["1", "Alice"]);
        assert_eq!(fields(&dataset.rows()[2]), vec!["3", "Charlie"]);
        assert_eq!(dataset.slice(1..3).len(), 2);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does_not_exist.csv");

        let err = CsvLoader.load(&path).unwrap_err();

        assert_eq!(err.kind(), SplitErrorKind::NotFound);
        match err {
            SplitError::NotFound { path: reported } => assert_eq!(reported, path),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(&dir, b"Id,Name\n");

        let dataset = CsvLoader.load(&path).expect("load failed");

        assert!(dataset.is_empty());
        assert_eq!(fields(dataset.headers()), vec!["Id", "Name"]);
    }

    #[test]
    fn test_empty_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(&dir, b"");

        let err = CsvLoader.load(&path).unwrap_err();

        assert_eq!(err.kind(), SplitErrorKind::OperationFailed);
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn test_inconsistent_columns_fail() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(&dir, b"Id,Name\n1,Alice\n2,Bob,extra\n");

        let err = CsvLoader.load(&path).unwrap_err();

        assert_eq!(err.kind(), SplitErrorKind::OperationFailed);
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(&dir, b"\xEF\xBB\xBFId,Name\n1,Alice\n");

        let dataset = CsvLoader.load(&path).expect("load failed");

        assert_eq!(fields(dataset.headers()), vec!["Id", "Name"]);
    }

    #[test]
    fn test_quoted_fields_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(
            &dir,
            b"Name,Address\n\"John\",\"123 Main St, Apt 4\nFloor 2\"\n",
        );

        let dataset = CsvLoader.load(&path).expect("load failed");

        assert_eq!(dataset.len(), 1);
        assert_eq!(
            fields(&dataset.rows()[0]),
            vec!["John", "123 Main St, Apt 4\nFloor 2"]
        );
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let dir = TempDir::new().unwrap();
        let path = create_test_csv(&dir, b"Name\ncaf\xE9\n");

        let dataset = CsvLoader.load(&path).expect("load failed");

        assert_eq!(dataset.rows()[0].get(0), Some(&b"caf\xE9"[..]));
    }

    #[test]
    fn test_dataset_new_rejects_ragged_rows() {
        let headers = ByteRecord::from(vec!["a", "b"]);
        let rows = vec![ByteRecord::from(vec!["1", "2"]), ByteRecord::from(vec!["3"])];

        let err = Dataset::new(headers, rows).unwrap_err();

        assert!(err.to_string().contains("Row 2"));
    }
}
