//! Fixed-offset POD5 header fields and the layout derived from them.

use std::ops::Range;

use pod5_common::BinaryReader;

use crate::table::RECORD_FIELDS_SIZE;
use crate::{Error, Result};

/// POD5 file magic bytes.
pub const MAGIC: &[u8; 4] = b"POD5";

/// Absolute offset of the entry count.
pub const ENTRY_COUNT_OFFSET: usize = 0x58;

/// Absolute offset of the entry-table offset field.
pub const TABLE_OFFSET_FIELD: usize = 0x108;

/// Absolute offset of the 4 reserved bytes after the table offset.
pub const RESERVED_FIELD: usize = 0x10C;

/// Absolute offset of the name blob size.
pub const NAME_BLOB_SIZE_FIELD: usize = 0x110;

/// Smallest file that can hold every header field.
pub const HEADER_SIZE: usize = NAME_BLOB_SIZE_FIELD + 4;

/// The three header fields the codec interprets.
///
/// Everything else in the first [`HEADER_SIZE`] bytes is carried through
/// untouched on rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of entry records
    pub entry_count: u32,
    /// Absolute offset of the entry table
    pub table_offset: u32,
    /// Length of the trailing name blob
    pub name_blob_size: u32,
}

impl Header {
    /// Check whether a buffer starts with the POD5 magic.
    pub fn is_pod5(data: &[u8]) -> bool {
        data.starts_with(MAGIC)
    }

    /// Parse the header of an archive held in memory.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !Self::is_pod5(data) {
            return Err(Error::InvalidMagic {
                expected: *MAGIC,
                actual: data[..data.len().min(MAGIC.len())].to_vec(),
            });
        }

        if data.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                size: data.len(),
                needed: HEADER_SIZE,
            });
        }

        let mut reader = BinaryReader::new_at(data, ENTRY_COUNT_OFFSET);
        let entry_count = reader.read_u32()?;

        reader.seek(TABLE_OFFSET_FIELD);
        let table_offset = reader.read_u32()?;
        reader.advance(4); // reserved
        let name_blob_size = reader.read_u32()?;

        Ok(Self {
            entry_count,
            table_offset,
            name_blob_size,
        })
    }

    /// Derive the table/name-blob layout for a file of `file_size` bytes.
    pub fn layout(&self, file_size: usize) -> Result<Layout> {
        Layout::new(
            file_size,
            self.table_offset,
            self.name_blob_size,
            self.entry_count as usize,
        )
    }
}

/// Region boundaries of an archive.
///
/// The file is `[prefix | entry table | name blob]`, where the prefix holds
/// the header and the payloads, and the name blob runs to end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Number of records in the entry table
    pub entry_count: usize,
    /// Absolute offset of the entry table
    pub table_offset: usize,
    /// Absolute offset of the name blob (`file_size - name_blob_size`)
    pub name_blob_offset: usize,
    /// Size of one entry record
    pub record_size: usize,
}

impl Layout {
    /// Compute the layout, rejecting tables that do not split into whole records.
    ///
    /// `entry_count` is passed separately because the importer sizes the
    /// table from the manifest rather than from the header.
    pub fn new(
        file_size: usize,
        table_offset: u32,
        name_blob_size: u32,
        entry_count: usize,
    ) -> Result<Self> {
        let name_blob_offset = file_size
            .checked_sub(name_blob_size as usize)
            .ok_or_else(|| {
                Error::InvalidLayout(format!(
                    "name blob size {} exceeds file size {}",
                    name_blob_size, file_size
                ))
            })?;

        let table_offset = table_offset as usize;
        if table_offset < HEADER_SIZE {
            return Err(Error::InvalidLayout(format!(
                "entry table offset {:#x} overlaps the {:#x} byte header",
                table_offset, HEADER_SIZE
            )));
        }
        if table_offset > name_blob_offset {
            return Err(Error::InvalidLayout(format!(
                "entry table offset {:#x} is past the name blob at {:#x}",
                table_offset, name_blob_offset
            )));
        }

        let table_len = name_blob_offset - table_offset;
        let record_size = match entry_count {
            0 if table_len == 0 => 0,
            0 => {
                return Err(Error::UnevenEntryTable {
                    table_len,
                    entry_count,
                })
            }
            n if table_len % n != 0 => {
                return Err(Error::UnevenEntryTable {
                    table_len,
                    entry_count,
                })
            }
            n => table_len / n,
        };

        if entry_count > 0 && record_size < RECORD_FIELDS_SIZE {
            return Err(Error::RecordTooSmall {
                record_size,
                minimum: RECORD_FIELDS_SIZE,
            });
        }

        Ok(Self {
            entry_count,
            table_offset,
            name_blob_offset,
            record_size,
        })
    }

    /// Length of the entry table in bytes.
    #[inline]
    pub fn table_len(&self) -> usize {
        self.name_blob_offset - self.table_offset
    }

    /// Byte range of record `index`, relative to the table start.
    #[inline]
    pub fn record_range(&self, index: usize) -> Range<usize> {
        let start = index * self.record_size;
        start..start + self.record_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn header_bytes(entry_count: u32, table_offset: u32, name_blob_size: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[..4].copy_from_slice(MAGIC);
        data[ENTRY_COUNT_OFFSET..ENTRY_COUNT_OFFSET + 4].copy_from_slice(&entry_count.to_le_bytes());
        data[TABLE_OFFSET_FIELD..TABLE_OFFSET_FIELD + 4].copy_from_slice(&table_offset.to_le_bytes());
        data[RESERVED_FIELD..RESERVED_FIELD + 4].copy_from_slice(&[0xEE; 4]);
        data[NAME_BLOB_SIZE_FIELD..NAME_BLOB_SIZE_FIELD + 4]
            .copy_from_slice(&name_blob_size.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_fields() {
        let data = header_bytes(3, 0x200, 0x40);
        let header = Header::parse(&data).unwrap();

        assert_eq!(header.entry_count, 3);
        assert_eq!(header.table_offset, 0x200);
        assert_eq!(header.name_blob_size, 0x40);
    }

    #[test]
    fn test_bad_magic() {
        let mut data = header_bytes(1, 0x200, 0x10);
        data[..4].copy_from_slice(b"POD3");

        let err = Header::parse(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic { .. }));
        assert_eq!(err.kind(), ErrorKind::Format);

        assert!(matches!(Header::parse(b"PO"), Err(Error::InvalidMagic { .. })));
    }

    #[test]
    fn test_truncated_header() {
        let data = b"POD5 short".to_vec();
        assert!(matches!(
            Header::parse(&data),
            Err(Error::Truncated { size: 10, .. })
        ));
    }

    #[test]
    fn test_layout_derivation() {
        // 0x200 table start, 3 records of 24 bytes, 0x30 byte name blob
        let file_size = 0x200 + 3 * 24 + 0x30;
        let layout = Layout::new(file_size, 0x200, 0x30, 3).unwrap();

        assert_eq!(layout.name_blob_offset, 0x200 + 72);
        assert_eq!(layout.record_size, 24);
        assert_eq!(layout.table_len(), 72);
        assert_eq!(layout.record_range(2), 48..72);
    }

    #[test]
    fn test_uneven_table_rejected() {
        let file_size = 0x200 + 50 + 0x10;
        let err = Layout::new(file_size, 0x200, 0x10, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::UnevenEntryTable {
                table_len: 50,
                entry_count: 3
            }
        ));
    }

    #[test]
    fn test_small_records_rejected() {
        let file_size = 0x200 + 2 * 8 + 0x10;
        assert!(matches!(
            Layout::new(file_size, 0x200, 0x10, 2),
            Err(Error::RecordTooSmall { record_size: 8, .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let layout = Layout::new(0x220, 0x210, 0x10, 0).unwrap();
        assert_eq!(layout.record_size, 0);
        assert!(Layout::new(0x230, 0x210, 0x10, 0).is_err());
    }

    #[test]
    fn test_offsets_outside_file() {
        assert!(matches!(
            Layout::new(0x100, 0x80, 0x200, 1),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            Layout::new(0x100, 0xF8, 0x10, 1),
            Err(Error::InvalidLayout(_))
        ));
        // Table inside the fixed header fields
        assert!(matches!(
            Layout::new(0x200, 0x100, 0x10, 1),
            Err(Error::InvalidLayout(_))
        ));
        assert!(Layout::new(HEADER_SIZE + 0x20, HEADER_SIZE as u32, 0x10, 1).is_ok());
    }
}
