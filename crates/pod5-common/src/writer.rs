//! In-place patching of little-endian fields in owned buffers.

use byteorder::{ByteOrder, LittleEndian};

use crate::{Error, Result};

/// Overwrite the u32 at `offset` with `value` (little-endian).
///
/// Fails without touching the buffer when the field would run past its end.
pub fn patch_u32(buffer: &mut [u8], offset: usize, value: u32) -> Result<()> {
    let field = field_mut(buffer, offset, 4)?;
    LittleEndian::write_u32(field, value);
    Ok(())
}

/// Overwrite `bytes.len()` bytes starting at `offset`.
pub fn patch_bytes(buffer: &mut [u8], offset: usize, bytes: &[u8]) -> Result<()> {
    field_mut(buffer, offset, bytes.len())?.copy_from_slice(bytes);
    Ok(())
}

fn field_mut(buffer: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8]> {
    let available = buffer.len().saturating_sub(offset);
    match offset.checked_add(len) {
        Some(end) if end <= buffer.len() => Ok(&mut buffer[offset..end]),
        _ => Err(Error::UnexpectedEof {
            offset,
            needed: len,
            available,
        }),
    }
}
