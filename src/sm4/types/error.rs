//! Custom error types for the rhk-sm4 crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum Sm4Error {
    /// An error originating from I/O operations, including failure to open the file.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes remained in the stream than a fixed-size record requires.
    #[error("Truncated {context} at byte {offset}: expected {expected} bytes, but found {found}")]
    Truncated {
        context: &'static str,
        offset: u64,
        expected: u64,
        found: u64,
    },

    /// A directory entry points outside of the file.
    #[error("Object of type {type_id} at {offset} x {size} exceeds file length {file_len}")]
    OutOfBounds {
        type_id: u32,
        offset: u64,
        size: u64,
        file_len: u64,
    },

    /// An error occurred while inflating a compressed payload.
    #[error("Decompression failed: {0}")]
    DecompressionError(String),

    /// The file is structurally invalid or does not match the expected SM4 layout.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// A convenience `Result` type alias using the crate's `Sm4Error` type.
pub type Result<T> = std::result::Result<T, Sm4Error>;
