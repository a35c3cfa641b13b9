// Error types
// Startup errors are fatal; request-level errors map onto HTTP status codes

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while starting the server
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("shared directory not found: {}", .path.display())]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shared path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("error listing files: {0}")]
    Scan(#[from] ScanError),
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a directory scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read root directory {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("scan task failed: {0}")]
    Task(String),
}

/// Reasons a download request is refused
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("path is not valid percent-encoded UTF-8")]
    BadEncoding,
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("path escapes the shared directory: {}", .0.display())]
    OutsideRoot(PathBuf),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}

impl DownloadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadEncoding => StatusCode::BAD_REQUEST,
            Self::InvalidPath(_) | Self::OutsideRoot(_) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
