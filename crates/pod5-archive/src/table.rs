//! Entry table records and name blob resolution.

use log::warn;
use pod5_common::BinaryReader;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::header::Layout;
use crate::{Error, Result};

/// Size of the interpreted prefix of every entry record.
pub const RECORD_FIELDS_SIZE: usize = std::mem::size_of::<RecordFields>();

/// The four meaningful fields at the start of an entry record.
///
/// Records are usually longer than this; the remaining bytes are opaque and
/// kept verbatim in [`EntryRecord::tail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RecordFields {
    /// Offset of the entry name inside the name blob
    pub name_offset: U32,
    /// Size of the payload as stored (compressed or raw)
    pub stored_size: U32,
    /// Absolute offset of the payload
    pub data_offset: U32,
    /// Size of the payload once inflated
    pub uncompressed_size: U32,
}

impl RecordFields {
    /// Point the record at a raw payload of `size` bytes at `offset`.
    ///
    /// Both size fields are set to `size`, which marks the entry as stored.
    pub fn relocate(&mut self, offset: u32, size: u32) {
        self.stored_size = U32::new(size);
        self.data_offset = U32::new(offset);
        self.uncompressed_size = U32::new(size);
    }
}

/// One parsed entry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Position in the entry table
    pub index: usize,
    /// Offset of the name inside the name blob
    pub name_offset: u32,
    /// Payload size as stored
    pub stored_size: u32,
    /// Absolute payload offset
    pub data_offset: u32,
    /// Inflated payload size
    pub uncompressed_size: u32,
    /// Opaque bytes following the four fields
    pub tail: Vec<u8>,
}

impl EntryRecord {
    /// An entry is compressed exactly when its two sizes differ.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.stored_size != self.uncompressed_size
    }

    /// The four interpreted fields in on-disk form.
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            name_offset: U32::new(self.name_offset),
            stored_size: U32::new(self.stored_size),
            data_offset: U32::new(self.data_offset),
            uncompressed_size: U32::new(self.uncompressed_size),
        }
    }

    /// Serialize the record back to its on-disk bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RECORD_FIELDS_SIZE + self.tail.len());
        out.extend_from_slice(self.fields().as_bytes());
        out.extend_from_slice(&self.tail);
        out
    }
}

/// Read every record of the entry table in index order.
pub fn read_entries(data: &[u8], layout: &Layout) -> Result<Vec<EntryRecord>> {
    let mut reader = BinaryReader::new_at(data, layout.table_offset);
    let mut entries = Vec::with_capacity(layout.entry_count);

    for index in 0..layout.entry_count {
        let fields: RecordFields = reader.read_struct()?;
        let tail = reader.read_bytes(layout.record_size - RECORD_FIELDS_SIZE)?;

        entries.push(EntryRecord {
            index,
            name_offset: fields.name_offset.get(),
            stored_size: fields.stored_size.get(),
            data_offset: fields.data_offset.get(),
            uncompressed_size: fields.uncompressed_size.get(),
            tail: tail.to_vec(),
        });
    }

    Ok(entries)
}

/// Resolve the null-terminated name of `record` from the name blob.
///
/// The scan stops at the first NUL or at end of file.
pub fn resolve_name(data: &[u8], layout: &Layout, record: &EntryRecord) -> Result<String> {
    let start = layout.name_blob_offset + record.name_offset as usize;
    if start > data.len() {
        return Err(Error::NameOutOfBounds {
            index: record.index,
            name_offset: record.name_offset,
        });
    }

    let name = BinaryReader::new_at(data, start).read_cstring_lossy();
    if !name.is_ascii() {
        warn!("entry {} has a non-ASCII name: {:?}", record.index, name);
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::ArchiveBuilder;
    use crate::header::Header;

    #[test]
    fn test_record_fields_layout() {
        assert_eq!(RECORD_FIELDS_SIZE, 16);

        let record = EntryRecord {
            index: 0,
            name_offset: 1,
            stored_size: 2,
            data_offset: 3,
            uncompressed_size: 4,
            tail: vec![0xAB, 0xCD],
        };
        let bytes = record.to_bytes();

        assert_eq!(bytes.len(), 18);
        assert_eq!(&bytes[..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &4u32.to_le_bytes());
        assert_eq!(&bytes[16..], &[0xAB, 0xCD]);
    }

    #[test]
    fn test_relocate_marks_stored() {
        let mut fields = RecordFields::read_from_bytes(&[7u8; 16]).unwrap();
        fields.relocate(0x400, 250);

        assert_eq!(fields.name_offset.get(), 0x0707_0707);
        assert_eq!(fields.stored_size.get(), 250);
        assert_eq!(fields.data_offset.get(), 0x400);
        assert_eq!(fields.uncompressed_size.get(), 250);
    }

    #[test]
    fn test_read_entries_and_names() {
        let data = ArchiveBuilder::new()
            .record_size(24)
            .stored("readme.txt", b"hello")
            .compressed("maps\\level1.map", &[1u8; 300])
            .build();

        let header = Header::parse(&data).unwrap();
        let layout = header.layout(data.len()).unwrap();
        let entries = read_entries(&data, &layout).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 0);
        assert!(!entries[0].is_compressed());
        assert_eq!(entries[0].stored_size, 5);
        assert!(entries[1].is_compressed());
        assert_eq!(entries[1].uncompressed_size, 300);
        assert_eq!(entries[1].tail.len(), 8);

        assert_eq!(resolve_name(&data, &layout, &entries[0]).unwrap(), "readme.txt");
        assert_eq!(
            resolve_name(&data, &layout, &entries[1]).unwrap(),
            "maps\\level1.map"
        );
    }

    #[test]
    fn test_name_offset_out_of_bounds() {
        let data = ArchiveBuilder::new().stored("a", b"x").build();
        let layout = Header::parse(&data).unwrap().layout(data.len()).unwrap();
        let mut record = read_entries(&data, &layout).unwrap().remove(0);
        record.name_offset = 0x1000;

        assert!(matches!(
            resolve_name(&data, &layout, &record),
            Err(Error::NameOutOfBounds { index: 0, .. })
        ));
    }
}
