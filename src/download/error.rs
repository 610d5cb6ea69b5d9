//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting a response body.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// File system error (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No `From<std::io::Error>`: every variant needs the path for context, which
// the source error does not carry. Use the `io()` constructor.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/report.pdf"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/report.pdf"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }
}
