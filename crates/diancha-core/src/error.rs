//! Domain error types.
//!
//! Gesture handling never fails: bad samples are ignored and invalid
//! transitions are no-ops. Errors only arise while building things:
//! parsing an ordinal, assembling a stage catalogue, loading content.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A value failed a construction-time invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// The stage content table is malformed or incomplete.
    #[error("content error: {0}")]
    Content(String),
}
