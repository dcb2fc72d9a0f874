//! Internal error model
//!
//! A small `thiserror` enum used by every fallible internal operation.
//! Nothing in this enum crosses the public API boundary: [`crate::get_json`]
//! and [`crate::get_part_data`] log the error via `tracing` and collapse it
//! to `None`, matching the "core functions never terminate the process;
//! they return null on failure" contract of the public surface.

use thiserror::Error;

/// Internal error type for the MIME rendering pipeline
#[derive(Debug, Error)]
pub enum AppError {
    /// The input file could not be opened or read
    #[error("failed to read message file: {0}")]
    Io(#[from] std::io::Error),
    /// The MIME parser could not construct a message from the bytes given
    #[error("failed to parse message: {0}")]
    Parse(String),
    /// The embedded-message recursion cap was reached while walking a MIME tree
    #[error("recursion limit exceeded while descending into {0}")]
    Recursion(&'static str),
    /// Any other internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Type alias for fallible internal operations
pub type AppResult<T> = Result<T, AppError>;
