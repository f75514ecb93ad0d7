use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// User-friendly error presentation for console and JSON reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPresentation {
    pub title: String,
    pub message: String,
    pub action: Option<String>,
}

/// Coarse failure category, for callers that branch on the kind of failure
/// rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplitErrorKind {
    /// The input path does not resolve to a file.
    NotFound,
    /// A precondition on the arguments was violated before any I/O.
    InvalidInput,
    /// Any read, parse or write failure.
    OperationFailed,
}

/// Errors produced while splitting a CSV file.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("File '{}' not found.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Split count must be at least 1, got {requested}")]
    InvalidSplitCount { requested: usize },

    #[error("{0}")]
    OperationFailed(String),
}

impl SplitError {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> SplitErrorKind {
        match self {
            SplitError::NotFound { .. } => SplitErrorKind::NotFound,
            SplitError::InvalidSplitCount { .. } => SplitErrorKind::InvalidInput,
            SplitError::OperationFailed(_) => SplitErrorKind::OperationFailed,
        }
    }

    /// Converts the error into a presentation suitable for printing.
    pub fn to_presentation(&self) -> ErrorPresentation {
        match self {
            SplitError::NotFound { path } => ErrorPresentation {
                title: "File Not Found".into(),
                message: format!("File '{}' not found.", path.display()),
                action: Some("Check the input path and try again".into()),
            },

            SplitError::InvalidSplitCount { requested } => ErrorPresentation {
                title: "Invalid Split Count".into(),
                message: format!(
                    "Cannot split into {} parts. The split count must be at least 1.",
                    requested
                ),
                action: Some("Pass a split count of 1 or more".into()),
            },

            SplitError::OperationFailed(msg) => ErrorPresentation {
                title: "Split Failed".into(),
                message: format!("An error occurred: {}", msg),
                action: Some("Check your CSV file format and output directory".into()),
            },
        }
    }
}

impl Serialize for SplitError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_presentation().serialize(serializer)
    }
}
