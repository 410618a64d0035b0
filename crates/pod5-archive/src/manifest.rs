//! The `_manifest.json` side-car written on extraction.
//!
//! The manifest records the layout each entry had in the source archive and
//! the SHA-256 of its decoded bytes. It is the only input the importer uses to
//! decide which extracted files were edited.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind as IoErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::archive::PodEntry;
use crate::payload::content_hash;
use crate::{Error, Result};

/// File name of the manifest inside an extraction directory.
pub const MANIFEST_FILE_NAME: &str = "_manifest.json";

/// One extracted entry as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Position in the entry table
    pub index: usize,
    /// Entry name exactly as stored in the archive
    pub name: String,
    /// Stored (possibly compressed) size in the source archive
    #[serde(rename = "original_zsize")]
    pub original_stored_size: u32,
    /// Inflated size in the source archive
    pub original_size: u32,
    /// Payload offset in the source archive
    pub original_offset: u32,
    /// Lowercase hex SHA-256 of the decoded payload
    #[serde(rename = "hash")]
    pub content_hash: String,
    /// Whether the source payload was a zlib stream
    pub compressed: bool,
}

impl ManifestEntry {
    /// Describe an archive entry and its decoded payload.
    pub fn new(entry: &PodEntry, payload: &[u8]) -> Self {
        Self {
            index: entry.index(),
            name: entry.name.clone(),
            original_stored_size: entry.record.stored_size,
            original_size: entry.record.uncompressed_size,
            original_offset: entry.record.data_offset,
            content_hash: content_hash(payload),
            compressed: entry.is_compressed(),
        }
    }
}

/// Ordered list of manifest entries, serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next entry.
    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    /// Entries in index order.
    #[inline]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the manifest has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> + '_ {
        self.entries.iter()
    }

    /// Load and validate a manifest from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|source| match source.kind() {
            IoErrorKind::NotFound => Error::ManifestNotFound(path.to_path_buf()),
            _ => Error::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let manifest: Manifest =
            serde_json::from_slice(&bytes).map_err(|source| Error::ManifestJson {
                path: path.to_path_buf(),
                source,
            })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Write the manifest as 2-space indented JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let file = File::create(path).map_err(Error::io(path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        writer.flush().map_err(Error::io(path))?;

        Ok(())
    }

    /// Indices must be exactly `0..len` in order, since the rebuild addresses
    /// table rows by index.
    fn validate(&self) -> Result<()> {
        for (position, entry) in self.entries.iter().enumerate() {
            if entry.index != position {
                return Err(Error::Manifest(format!(
                    "entry {:?} at position {} has index {}",
                    entry.name, position, entry.index
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
