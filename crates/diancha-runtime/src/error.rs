//! Diancha — runtime error types.

use diancha_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the driver.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A domain object could not be built.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A script does not parse or is out of order.
    #[error("script error: {0}")]
    Script(String),

    /// Reading a script or content file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
