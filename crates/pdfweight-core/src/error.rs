//! Error types for the pdfweight-core library.
//!
//! Scanning and aggregation never fail; only file I/O surfaces errors.
//! The variants here carry the offending path so callers can report it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfweight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all pdfweight operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an exported stream
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An export target would land outside the output directory
    #[error("path traversal detected: '{path}' would escape output directory")]
    PathTraversal {
        /// The suspicious path
        path: PathBuf,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Returns true if the pipeline can carry on after this error.
    ///
    /// Only a failed load aborts a run; export failures are per item.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::FileRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::path_traversal("../etc/passwd");
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));

        let err = Error::file_read("missing.pdf", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("failed to read file 'missing.pdf'"));
    }

    #[test]
    fn test_is_recoverable() {
        let io_err = || io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(!Error::file_read("a.pdf", io_err()).is_recoverable());
        assert!(Error::file_write("out/image_1.jpg", io_err()).is_recoverable());
        assert!(Error::directory_create("out", io_err()).is_recoverable());
    }
}
