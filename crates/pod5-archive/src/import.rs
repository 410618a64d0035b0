//! Change detection and archive rebuild.
//!
//! The rebuilt archive is assembled in memory from four segments:
//!
//! ```text
//! [ original 0..table_offset ]         header + untouched payloads
//! [ modified payloads, raw ]           appended in ascending index order
//! [ entry table, modified rows patched ]
//! [ original name blob ]
//! ```
//!
//! and the header's table offset is patched to the start of the third
//! segment. The name blob stays at the tail, so `file_size - name_blob_size`
//! still locates it without touching its size field.
//!
//! Modified payloads are always written uncompressed: both size fields of a
//! relocated record are set to the new length, which reads back as a stored
//! entry even if the original was a zlib stream.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use pod5_common::{writer, BinaryReader, IntoBytes};

use crate::header::{Header, Layout, HEADER_SIZE, TABLE_OFFSET_FIELD};
use crate::manifest::Manifest;
use crate::path::{entry_path, rebuilt_archive_path};
use crate::payload::content_hash;
use crate::table::RecordFields;
use crate::{Error, Result};

/// An extracted file whose contents no longer match the manifest hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedEntry {
    /// Position in the entry table
    pub index: usize,
    /// Entry name as recorded in the manifest
    pub name: String,
    /// Current file contents
    pub data: Vec<u8>,
}

/// Compare every extracted file against its manifest hash.
///
/// Returns the changed entries in ascending index order. Any unreadable file
/// aborts the scan with an I/O error naming it.
pub fn detect_changes(manifest: &Manifest, extracted_dir: &Path) -> Result<Vec<ModifiedEntry>> {
    let mut modified = Vec::new();

    for entry in manifest {
        let path = extracted_dir.join(entry_path(&entry.name)?);
        let data = fs::read(&path).map_err(Error::io(&path))?;

        if content_hash(&data) != entry.content_hash {
            debug!(
                "#{} {} changed ({} -> {} bytes)",
                entry.index,
                entry.name,
                entry.original_size,
                data.len()
            );
            modified.push(ModifiedEntry {
                index: entry.index,
                name: entry.name.clone(),
                data,
            });
        }
    }

    modified.sort_by_key(|m| m.index);
    Ok(modified)
}

/// Run change detection for an extraction directory without rebuilding.
pub fn status<P: AsRef<Path>, Q: AsRef<Path>>(
    extracted_dir: P,
    manifest_path: Q,
) -> Result<Vec<ModifiedEntry>> {
    let manifest = Manifest::load(manifest_path)?;
    detect_changes(&manifest, extracted_dir.as_ref())
}

/// Assemble a new archive image with `modified` payloads relocated.
///
/// `modified` must be sorted by index. `progress` is called once per entry
/// with the percentage of modified entries processed and the entry name.
pub fn rebuild(
    original: &[u8],
    layout: &Layout,
    modified: &[ModifiedEntry],
    mut progress: impl FnMut(f32, &str),
) -> Result<Vec<u8>> {
    if layout.table_offset < HEADER_SIZE
        || layout.table_offset > layout.name_blob_offset
        || layout.name_blob_offset > original.len()
    {
        return Err(Error::InvalidLayout(format!(
            "table at {:#x} and names at {:#x} do not fit a {} byte archive",
            layout.table_offset,
            layout.name_blob_offset,
            original.len()
        )));
    }
    if layout.entry_count.checked_mul(layout.record_size) != Some(layout.table_len()) {
        return Err(Error::InvalidLayout(format!(
            "{} records of {} bytes do not fill a {} byte table",
            layout.entry_count,
            layout.record_size,
            layout.table_len()
        )));
    }

    let prefix = &original[..layout.table_offset];
    let table = &original[layout.table_offset..layout.name_blob_offset];
    let names = &original[layout.name_blob_offset..];

    let appended: usize = modified.iter().map(|m| m.data.len()).sum();
    let mut out = Vec::with_capacity(original.len() + appended);
    out.extend_from_slice(prefix);

    let total = modified.len();
    let mut relocated = Vec::with_capacity(total);
    for (done, entry) in modified.iter().enumerate() {
        if entry.index >= layout.entry_count {
            return Err(Error::Manifest(format!(
                "entry {} is outside a table of {} records",
                entry.index, layout.entry_count
            )));
        }

        let offset = to_u32(out.len(), entry.index)?;
        let size = to_u32(entry.data.len(), entry.index)?;
        out.extend_from_slice(&entry.data);
        relocated.push((entry.index, offset, size));

        progress((done + 1) as f32 / total as f32 * 100.0, &entry.name);
    }

    let table_start = out.len();
    let new_table_offset = to_u32(table_start, 0)?;
    out.extend_from_slice(table);

    for (index, offset, size) in relocated {
        let row = table_start + layout.record_range(index).start;
        let mut fields: RecordFields = BinaryReader::new_at(&out, row).read_struct()?;
        fields.relocate(offset, size);
        writer::patch_bytes(&mut out, row, fields.as_bytes())?;
    }

    out.extend_from_slice(names);
    writer::patch_u32(&mut out, TABLE_OFFSET_FIELD, new_table_offset)?;

    Ok(out)
}

/// Rebuild `original_path` from the edited files in `extracted_dir`.
///
/// Returns `false` without writing anything when no file changed; otherwise
/// writes `<stem>_new.pod` next to the original and returns `true`.
pub fn import<P, Q, R>(
    original_path: P,
    extracted_dir: Q,
    manifest_path: R,
    mut progress: Option<&mut dyn FnMut(f32, &str)>,
) -> Result<bool>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let original_path = original_path.as_ref();

    let manifest = Manifest::load(manifest_path)?;
    let original = fs::read(original_path).map_err(Error::io(original_path))?;

    let header = Header::parse(&original)?;
    if header.entry_count as usize != manifest.len() {
        warn!(
            "header lists {} entries but manifest has {}; sizing the table from the manifest",
            header.entry_count,
            manifest.len()
        );
    }
    let layout = Layout::new(
        original.len(),
        header.table_offset,
        header.name_blob_size,
        manifest.len(),
    )?;

    let modified = detect_changes(&manifest, extracted_dir.as_ref())?;
    if modified.is_empty() {
        info!("no modified entries, nothing to import");
        return Ok(false);
    }

    let rebuilt = rebuild(&original, &layout, &modified, |percent, label| {
        if let Some(callback) = progress.as_deref_mut() {
            callback(percent, label);
        }
    })?;

    let output = rebuilt_archive_path(original_path);
    fs::write(&output, &rebuilt).map_err(Error::io(&output))?;

    info!(
        "relocated {} of {} entries into {} ({} bytes)",
        modified.len(),
        manifest.len(),
        output.display(),
        rebuilt.len()
    );
    Ok(true)
}

fn to_u32(value: usize, index: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::OffsetOverflow { index, value })
}
