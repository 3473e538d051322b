//! kreachdist error type

use thiserror::Error;

/// Errors that can terminate a `kreachdist` run.
///
/// Conditions that spec.md treats as best-effort degradations (no target
/// found, unsupported terminator, malformed IR) are *not* represented here:
/// they are logged as warnings and the pipeline continues. Only conditions
/// that prevent producing any result at all are hard errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or contradictory CLI arguments
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Io error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required file could not be found or resolved
    #[error("missing file: {0}")]
    MissingFile(String),

    /// Configuration could not be loaded or was malformed
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The logging backend could not be initialized
    #[error("logger error: {0}")]
    LoggerError(String),

    /// Something else happened
    #[error("{0}")]
    Unknown(String),
}
