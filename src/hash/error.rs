// Error types for digest computation
// Every failure is returned as a value carrying the path and the OS cause

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Why a digest could not be produced for an input
#[derive(Debug)]
pub enum DigestError {
    /// No path supplied where one was required
    InputMissing,

    /// The path could not be opened, or is not a regular file
    Unreadable { path: PathBuf, source: io::Error },

    /// Reading failed after the file was opened
    Read { path: PathBuf, source: io::Error },
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DigestError::InputMissing => {
                write!(f, "No file selected\n")?;
                write!(f, "Suggestion: Provide at least one file path")
            }
            DigestError::Unreadable { path, source } => {
                write!(f, "Cannot open {}: {}\n", path.display(), source)?;
                write!(f, "Suggestion: Check that the path exists, is a regular file, and is readable")
            }
            DigestError::Read { path, source } => {
                write!(f, "I/O error while reading {}: {}\n", path.display(), source)?;
                write!(f, "Suggestion: Check the storage device and try again")
            }
        }
    }
}

impl std::error::Error for DigestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DigestError::Unreadable { source, .. } | DigestError::Read { source, .. } => Some(source),
            DigestError::InputMissing => None,
        }
    }
}

impl DigestError {
    /// Open or metadata failure for `path`
    pub fn unreadable(path: &Path, source: io::Error) -> Self {
        DigestError::Unreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Read failure on an already opened `path`
    pub fn read(path: &Path, source: io::Error) -> Self {
        DigestError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path the failure refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            DigestError::Unreadable { path, .. } | DigestError::Read { path, .. } => Some(path),
            DigestError::InputMissing => None,
        }
    }

    /// Short machine-friendly name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            DigestError::InputMissing => "input_missing",
            DigestError::Unreadable { .. } => "unreadable",
            DigestError::Read { .. } => "io_error",
        }
    }

    /// The underlying OS error message without the suggestion line
    pub fn reason(&self) -> String {
        match self {
            DigestError::InputMissing => "no file selected".to_string(),
            DigestError::Unreadable { source, .. } | DigestError::Read { source, .. } => {
                source.to_string()
            }
        }
    }
}

/// Serializable shape of a `DigestError`, shared by every JSON output
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub reason: String,
}

impl From<&DigestError> for ErrorReport {
    fn from(error: &DigestError) -> Self {
        ErrorReport {
            kind: error.kind(),
            path: error.path().map(|p| p.display().to_string()),
            reason: error.reason(),
        }
    }
}
