//! Error types for jf-native-interop

use thiserror::Error;

use crate::config::{LIBRARY_PATH_ENV, MODE_ENV};
use crate::locator::LIBRARY_BASE_NAME;

/// Result type alias for jf-native-interop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Native exit code for a successful call
pub const EXIT_SUCCESS: i32 = 0;

/// Native exit code for a failed call
pub const EXIT_FAILURE: i32 = -1;

/// Why the native path was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Mode is `Disabled`
    ModeDisabled,
    /// The library could not be loaded, or its health probe failed
    LibraryUnavailable,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::ModeDisabled => write!(f, "native mode disabled"),
            UnavailableReason::LibraryUnavailable => write!(f, "native library unavailable"),
        }
    }
}

/// Error types for the native boundary and the managed parsers
#[derive(Error, Debug)]
pub enum Error {
    /// Required mode without an operational native library (startup only)
    #[error(
        "{}=required but {} could not be loaded. Set {} or switch mode to prefer/disabled.",
        MODE_ENV,
        LIBRARY_BASE_NAME,
        LIBRARY_PATH_ENV
    )]
    Configuration,

    /// Native path not attempted
    #[error("{0}")]
    Unavailable(UnavailableReason),

    /// Native call returned a non-zero exit code
    #[error("{0}")]
    ForeignCall(String),

    /// Native call succeeded but the payload has the wrong shape
    #[error("native parser returned an invalid payload: {0}")]
    Payload(String),

    /// Native capability failed while mode is `Required`
    #[error("native {capability} failed while JELLYFIN_NATIVE_MODE=required: {reason}")]
    NativeRequired {
        capability: &'static str,
        reason: String,
    },

    /// Transcript bytes are not UTF-8
    #[error("invalid utf-8 input: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Probe document is not valid JSON
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convert to a native exit code
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }

    /// Whether the error must stop the process instead of degrading
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration | Error::NativeRequired { .. })
    }
}
