//! Error types for pod5-common.

use thiserror::Error;

/// Common error type for binary reads and writes.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading or patching.
    #[error(
        "unexpected end of buffer at offset {offset:#x}: needed {needed} bytes but only {available} available"
    )]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
