//! Synthetic archive builder shared by the unit tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::header::{
    ENTRY_COUNT_OFFSET, HEADER_SIZE, MAGIC, NAME_BLOB_SIZE_FIELD, RESERVED_FIELD,
    TABLE_OFFSET_FIELD,
};
use crate::table::{EntryRecord, RECORD_FIELDS_SIZE};

/// Value written into the reserved header field.
pub const RESERVED_MARKER: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// Header region size; everything between the fields is filler.
const HEADER_LEN: usize = 0x120;

struct FixtureEntry {
    name: String,
    stored: Vec<u8>,
    uncompressed_size: u32,
}

/// Builds `[header | payloads | entry table | name blob]` byte images.
pub struct ArchiveBuilder {
    record_size: usize,
    entries: Vec<FixtureEntry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            record_size: 20,
            entries: Vec::new(),
        }
    }

    pub fn record_size(mut self, record_size: usize) -> Self {
        assert!(record_size >= RECORD_FIELDS_SIZE);
        self.record_size = record_size;
        self
    }

    /// Add an entry stored raw.
    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        let size = data.len() as u32;
        self.raw(name, data.to_vec(), size)
    }

    /// Add an entry stored as a zlib stream.
    pub fn compressed(self, name: &str, data: &[u8]) -> Self {
        let size = data.len() as u32;
        self.raw(name, zlib(data), size)
    }

    /// Add an entry with arbitrary stored bytes and declared inflated size.
    pub fn raw(mut self, name: &str, stored: Vec<u8>, uncompressed_size: u32) -> Self {
        self.entries.push(FixtureEntry {
            name: name.to_string(),
            stored,
            uncompressed_size,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data: Vec<u8> = (0..HEADER_LEN).map(|i| (i % 251) as u8).collect();
        data[..4].copy_from_slice(MAGIC);

        let mut offsets = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            offsets.push(data.len() as u32);
            data.extend_from_slice(&entry.stored);
        }

        let mut names = Vec::new();
        let mut name_offsets = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            name_offsets.push(names.len() as u32);
            names.extend_from_slice(entry.name.as_bytes());
            names.push(0);
        }

        let table_offset = data.len() as u32;
        for (index, entry) in self.entries.iter().enumerate() {
            let tail_len = self.record_size - RECORD_FIELDS_SIZE;
            let record = EntryRecord {
                index,
                name_offset: name_offsets[index],
                stored_size: entry.stored.len() as u32,
                data_offset: offsets[index],
                uncompressed_size: entry.uncompressed_size,
                tail: (0..tail_len).map(|i| (index as u8) ^ 0xC3 ^ (i as u8)).collect(),
            };
            data.extend_from_slice(&record.to_bytes());
        }

        data.extend_from_slice(&names);

        put_u32(&mut data, ENTRY_COUNT_OFFSET, self.entries.len() as u32);
        put_u32(&mut data, TABLE_OFFSET_FIELD, table_offset);
        data[RESERVED_FIELD..RESERVED_FIELD + 4].copy_from_slice(&RESERVED_MARKER);
        put_u32(&mut data, NAME_BLOB_SIZE_FIELD, names.len() as u32);

        debug_assert!(HEADER_LEN >= HEADER_SIZE);
        data
    }

    /// Build and write the archive to `dir/file_name`.
    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Compress `data` as a zlib stream.
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
