//! Common utilities for POD5 tooling.
//!
//! This crate provides the byte-level building blocks shared by the archive
//! codec:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`writer`] - In-place little-endian patching of owned buffers

mod error;
mod reader;

pub mod writer;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
