//! Payload extraction, zlib inflation and content hashing.

use std::io::Read;

use flate2::read::ZlibDecoder;
use sha2::{Digest, Sha256};

use crate::table::EntryRecord;
use crate::{Error, Result};

/// Return the decoded bytes of `record`.
///
/// Entries whose stored and uncompressed sizes match are returned as-is;
/// everything else is inflated as a zlib stream and must come out at exactly
/// `uncompressed_size` bytes.
pub fn read_payload(data: &[u8], record: &EntryRecord) -> Result<Vec<u8>> {
    let start = record.data_offset as usize;
    let stored = start
        .checked_add(record.stored_size as usize)
        .and_then(|end| data.get(start..end))
        .ok_or(Error::PayloadOutOfBounds {
            index: record.index,
            offset: record.data_offset,
            size: record.stored_size,
        })?;

    if !record.is_compressed() {
        return Ok(stored.to_vec());
    }

    inflate(stored, record.uncompressed_size as usize, record.index)
}

/// Inflate a zlib stream with a known output size.
pub fn inflate(stored: &[u8], expected_size: usize, index: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size);
    ZlibDecoder::new(stored)
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression {
            index,
            message: e.to_string(),
        })?;

    if output.len() != expected_size {
        return Err(Error::SizeMismatch {
            index,
            expected: expected_size,
            actual: output.len(),
        });
    }

    Ok(output)
}

/// Lowercase hex SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::zlib;
    use crate::ErrorKind;

    fn record(data_offset: u32, stored_size: u32, uncompressed_size: u32) -> EntryRecord {
        EntryRecord {
            index: 4,
            name_offset: 0,
            stored_size,
            data_offset,
            uncompressed_size,
            tail: Vec::new(),
        }
    }

    #[test]
    fn test_stored_payload() {
        let data = b"....payload....";
        let out = read_payload(data, &record(4, 7, 7)).unwrap();
        assert_eq!(out, b"payload");
    }

    #[test]
    fn test_compressed_payload() {
        let original = b"abcd".repeat(50);
        let compressed = zlib(&original);
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&compressed);

        let out = read_payload(&data, &record(8, compressed.len() as u32, 200)).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_corrupt_stream_is_decode_error() {
        let data = vec![0x55u8; 32];
        let err = read_payload(&data, &record(0, 32, 100)).unwrap_err();

        assert!(matches!(err, Error::Decompression { index: 4, .. }));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_inflated_size_checked() {
        let compressed = zlib(&[9u8; 64]);
        let err = inflate(&compressed, 65, 1).unwrap_err();

        assert!(matches!(
            err,
            Error::SizeMismatch {
                index: 1,
                expected: 65,
                actual: 64
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_payload_outside_file() {
        let data = vec![0u8; 16];
        assert!(matches!(
            read_payload(&data, &record(10, 10, 10)),
            Err(Error::PayloadOutOfBounds { index: 4, .. })
        ));
        assert!(matches!(
            read_payload(&data, &record(u32::MAX, u32::MAX, 1)),
            Err(Error::PayloadOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        let hash = content_hash(b"hello");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
