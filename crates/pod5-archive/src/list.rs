//! Read-only entry listing.

use std::path::Path;

use serde::Serialize;

use crate::archive::{PodArchive, PodEntry};
use crate::Result;

/// Summary of one entry, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub index: usize,
    pub name: String,
    pub stored_size: u32,
    pub uncompressed_size: u32,
    pub data_offset: u32,
    pub compressed: bool,
}

impl From<&PodEntry> for ListedEntry {
    fn from(entry: &PodEntry) -> Self {
        Self {
            index: entry.index(),
            name: entry.name.clone(),
            stored_size: entry.record.stored_size,
            uncompressed_size: entry.record.uncompressed_size,
            data_offset: entry.record.data_offset,
            compressed: entry.is_compressed(),
        }
    }
}

/// List the entries of an archive in index order.
///
/// Only the header, entry table and name blob are interpreted; payloads are
/// never decoded and nothing is written.
pub fn list<P: AsRef<Path>>(input: P) -> Result<Vec<ListedEntry>> {
    let archive = PodArchive::open(input)?;
    Ok(archive.iter().map(ListedEntry::from).collect())
}
