//! POD5 archive codec.
//!
//! Reads, extracts and rebuilds the POD5 container format used by Terminal
//! Reality games. A POD5 file is laid out as:
//!
//! ```text
//! [ header (0x114+ bytes) | payloads | entry table | name blob ]
//! ```
//!
//! Payloads are either raw or zlib streams; an entry is compressed when its
//! stored and uncompressed sizes differ.
//!
//! # Example
//!
//! ```no_run
//! use pod5_archive::{export, import};
//!
//! // Unpack, edit files on disk, then repack into GAME_new.pod
//! export("GAME.POD", "GAME_extracted")?;
//! let changed = import("GAME.POD", "GAME_extracted", "GAME_extracted/_manifest.json", None)?;
//! println!("rebuilt: {}", changed);
//! # Ok::<(), pod5_archive::Error>(())
//! ```

mod archive;
mod error;
mod export;
pub mod header;
mod import;
mod list;
pub mod manifest;
pub mod path;
pub mod payload;
pub mod table;

#[cfg(test)]
mod fixture;

pub use archive::{PodArchive, PodEntry};
pub use error::{Error, ErrorKind, Result};
pub use export::{export, export_archive};
pub use header::{Header, Layout};
pub use import::{detect_changes, import, rebuild, status, ModifiedEntry};
pub use list::{list, ListedEntry};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE_NAME};
pub use path::{default_extract_dir, rebuilt_archive_path};
pub use payload::content_hash;
pub use table::EntryRecord;
