//! Error Types
//!
//! All fallible operations in this crate return [`Result`], an alias over the
//! single crate-wide [`Error`] enum. Most of the core is infallible by design
//! (decoding is lenient, beam search always produces output); errors are
//! reserved for genuinely exceptional situations like missing files or
//! mismatched evaluation inputs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by tokenizer persistence, corpus loading and metrics.
#[derive(Debug, Error)]
pub enum Error {
    /// No serialized state exists at the requested location.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// A caller-supplied argument violated a documented precondition,
    /// e.g. a vocabulary size below 256 or metric inputs of unequal length.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Underlying filesystem failure while reading or writing state.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialized tokenizer state could not be written or parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
