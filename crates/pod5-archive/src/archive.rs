//! In-memory POD5 archive reader.

use std::fs;
use std::path::Path;

use log::debug;

use crate::header::{Header, Layout};
use crate::payload;
use crate::table::{self, EntryRecord};
use crate::{Error, Result};

/// An entry record together with its resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodEntry {
    /// Name from the name blob
    pub name: String,
    /// Raw table record
    pub record: EntryRecord,
}

impl PodEntry {
    /// Position in the entry table.
    #[inline]
    pub fn index(&self) -> usize {
        self.record.index
    }

    /// Whether the payload is stored as a zlib stream.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.record.is_compressed()
    }
}

/// A POD5 archive loaded into memory.
///
/// Opening parses the header, the entry table and every name; payloads are
/// only decoded on [`PodArchive::read`].
pub struct PodArchive {
    /// Whole file contents
    data: Vec<u8>,
    /// Archive file name
    name: String,
    header: Header,
    layout: Layout,
    entries: Vec<PodEntry>,
}

impl PodArchive {
    /// Read and parse an archive from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(Error::io(path))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_bytes(data, name)
    }

    /// Parse an archive already held in memory.
    pub fn from_bytes(data: Vec<u8>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let header = Header::parse(&data)?;
        let layout = header.layout(data.len())?;

        debug!(
            "{}: {} entries, table at {:#x}, {} byte records, names at {:#x}",
            name, layout.entry_count, layout.table_offset, layout.record_size, layout.name_blob_offset
        );

        let entries = table::read_entries(&data, &layout)?
            .into_iter()
            .map(|record| {
                let name = table::resolve_name(&data, &layout, &record)?;
                Ok(PodEntry { name, record })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            data,
            name,
            header,
            layout,
            entries,
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parsed header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the derived region layout.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over entries in index order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PodEntry> + '_ {
        self.entries.iter()
    }

    /// Get entry by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PodEntry> {
        self.entries.get(index)
    }

    /// Decode an entry's payload.
    pub fn read(&self, entry: &PodEntry) -> Result<Vec<u8>> {
        payload::read_payload(&self.data, &entry.record)
    }
}

impl std::fmt::Debug for PodArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodArchive")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}
