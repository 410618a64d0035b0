//! POD5 - Terminal Reality game archive extraction and re-packing library.
//!
//! This crate provides a unified interface to the POD5 crates.
//!
//! # Crates
//!
//! - [`pod5_common`] - Common utilities (binary reading, in-place patching)
//! - [`pod5_archive`] - POD5 archive codec (export, import, list)
//!
//! # Example
//!
//! ```no_run
//! use pod5::prelude::*;
//!
//! // Open a POD5 archive
//! let archive = PodArchive::open("GAME.POD")?;
//!
//! // Decode the first entry
//! if let Some(entry) = archive.get(0) {
//!     let data = archive.read(entry)?;
//!     println!("{}: {} bytes", entry.name, data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use pod5_archive as archive;
pub use pod5_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use pod5_archive::{
        default_extract_dir, export, import, list, rebuilt_archive_path, status, ErrorKind,
        ListedEntry, Manifest, ManifestEntry, ModifiedEntry, PodArchive, PodEntry,
        MANIFEST_FILE_NAME,
    };
    pub use pod5_common::BinaryReader;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
