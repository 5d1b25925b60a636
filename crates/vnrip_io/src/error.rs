//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An access of `requested` bytes at `offset` would cross the end of the stream
    #[error("cannot access {requested} bytes at offset {offset:#x}, stream is only {size:#x} bytes")]
    #[diagnostic(help("the file is truncated or an offset inside it is corrupt"))]
    OutOfBounds {
        /// Position the access started at
        offset: u64,
        /// Number of bytes the access needed
        requested: u64,
        /// Total size of the stream
        size: u64,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
