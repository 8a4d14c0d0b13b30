use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::codes::{error_code_label, AsiErrorCode};

/// Errors returned by the capture utilities.
#[derive(Debug, Error)]
pub enum Error {
    /// The SDK reports no connected cameras.
    #[error("No cameras detected!")]
    NoCameras,
    /// The requested camera index is not connected.
    #[error("Camera {index} doesn't exist! ({count} connected)")]
    InvalidIndex {
        /// Requested index.
        index: i32,
        /// Number of connected cameras.
        count: i32,
    },
    /// An SDK call returned a non-success status.
    #[error("{file}:{line} - ASI Error: {status} [{}] in {call}()", status_label(.status))]
    Sdk {
        /// Name of the failing call.
        call: &'static str,
        /// Raw status returned by the SDK.
        status: i32,
        /// Source file of the call site.
        file: &'static str,
        /// Source line of the call site.
        line: u32,
    },
    /// The camera reported a failed exposure.
    #[error("Exposure failed")]
    ExposureFailed,
    /// The exposure did not complete in time.
    #[error("Exposure did not complete within {0:?}")]
    ExposureTimeout(Duration),
    /// Capture was interrupted by the user.
    #[error("Capture cancelled")]
    Cancelled,
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Malformed option or value.
    #[error("Bad Options: {0}")]
    InvalidArgument(String),
    /// The configuration file could not be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The SDK status behind an [`Error::Sdk`], if it is a known code.
    pub fn asi_code(&self) -> Option<AsiErrorCode> {
        match self {
            Self::Sdk { status, .. } => AsiErrorCode::from_raw(*status),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn status_label(status: &i32) -> &'static str {
    error_code_label(*status)
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
