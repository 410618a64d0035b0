//! Error types for the POD5 archive crate.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive or manifest does not have the expected structure.
    Format,
    /// A filesystem read or write failed.
    Io,
    /// A compressed payload could not be inflated.
    Decode,
}

/// Errors that can occur when working with POD5 archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on a specific file or directory.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Common library error (buffer overrun while reading a field).
    #[error("{0}")]
    Common(#[from] pod5_common::Error),

    /// Invalid POD5 magic bytes.
    #[error("invalid POD5 magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: Vec<u8> },

    /// File is too small to hold the fixed header.
    #[error("file too small for a POD5 header: {size} bytes, need {needed}")]
    Truncated { size: usize, needed: usize },

    /// Header offsets point outside the file or overlap each other.
    #[error("invalid archive layout: {0}")]
    InvalidLayout(String),

    /// The entry table does not split evenly into `entry_count` records.
    #[error("entry table of {table_len} bytes does not divide into {entry_count} records")]
    UnevenEntryTable { table_len: usize, entry_count: usize },

    /// Entry records are too small to hold the four fixed fields.
    #[error("entry record size {record_size} is smaller than the {minimum} byte minimum")]
    RecordTooSmall { record_size: usize, minimum: usize },

    /// A name offset points past the end of the file.
    #[error("name offset {name_offset:#x} of entry {index} is outside the name blob")]
    NameOutOfBounds { index: usize, name_offset: u32 },

    /// A payload range does not fit inside the file.
    #[error("payload of entry {index} ({size} bytes at {offset:#x}) is outside the file")]
    PayloadOutOfBounds { index: usize, offset: u32, size: u32 },

    /// An entry name would escape the extraction directory.
    #[error("unsafe entry name: {0:?}")]
    UnsafeEntryName(String),

    /// Two entry names resolve to the same extracted file.
    #[error("entries {first} and {second} both extract to {}", path.display())]
    DuplicateEntryPath {
        first: usize,
        second: usize,
        path: PathBuf,
    },

    /// Manifest file does not exist.
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    /// Manifest JSON could not be parsed.
    #[error("malformed manifest {}: {source}", path.display())]
    ManifestJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest parsed but its contents are inconsistent.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// A rebuilt offset or size no longer fits the 32-bit fields.
    #[error("entry {index}: value {value} does not fit in a 32-bit archive field")]
    OffsetOverflow { index: usize, value: usize },

    /// zlib stream could not be inflated.
    #[error("decompression error in entry {index}: {message}")]
    Decompression { index: usize, message: String },

    /// Inflated payload length differs from the recorded size.
    #[error("entry {index} inflated to {actual} bytes, expected {expected}")]
    SizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    /// Classify this error as a format, I/O or decode failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Decompression { .. } | Error::SizeMismatch { .. } => ErrorKind::Decode,
            Error::Common(_)
            | Error::InvalidMagic { .. }
            | Error::Truncated { .. }
            | Error::InvalidLayout(_)
            | Error::UnevenEntryTable { .. }
            | Error::RecordTooSmall { .. }
            | Error::NameOutOfBounds { .. }
            | Error::PayloadOutOfBounds { .. }
            | Error::UnsafeEntryName(_)
            | Error::DuplicateEntryPath { .. }
            | Error::ManifestNotFound(_)
            | Error::ManifestJson { .. }
            | Error::Manifest(_)
            | Error::OffsetOverflow { .. } => ErrorKind::Format,
        }
    }

    /// Build a `map_err` adapter that tags an I/O error with `path`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for POD5 operations.
pub type Result<T> = std::result::Result<T, Error>;
