//! Extraction of every entry to a directory tree plus manifest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::archive::PodArchive;
use crate::manifest::{Manifest, ManifestEntry, MANIFEST_FILE_NAME};
use crate::path::entry_path;
use crate::{Error, Result};

/// Extract `input` into `output_dir` and write `_manifest.json` there.
///
/// Existing files are overwritten. A failure part-way through leaves the
/// files already written in place.
pub fn export<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> Result<Manifest> {
    let archive = PodArchive::open(input)?;
    export_archive(&archive, output_dir.as_ref())
}

/// Extract an already opened archive.
///
/// Every name is resolved before anything is written, so an unsafe or
/// colliding name leaves the output directory untouched.
pub fn export_archive(archive: &PodArchive, output_dir: &Path) -> Result<Manifest> {
    let paths = resolve_paths(archive, output_dir)?;
    fs::create_dir_all(output_dir).map_err(Error::io(output_dir))?;

    let mut manifest = Manifest::new();
    for (entry, output_path) in archive.iter().zip(paths) {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(Error::io(parent))?;
        }

        let data = archive.read(entry)?;
        fs::write(&output_path, &data).map_err(Error::io(&output_path))?;

        debug!(
            "extracted #{} {} ({} -> {} bytes)",
            entry.index(),
            entry.name,
            entry.record.stored_size,
            data.len()
        );
        manifest.push(ManifestEntry::new(entry, &data));
    }

    manifest.save(output_dir.join(MANIFEST_FILE_NAME))?;

    info!(
        "extracted {} entries from {} to {}",
        manifest.len(),
        archive.name(),
        output_dir.display()
    );
    Ok(manifest)
}

/// Map every entry to its file under `output_dir`.
///
/// `a/b` and `a\b` land on the same file, and so would any other pair of
/// names that normalize alike; those are rejected.
fn resolve_paths(archive: &PodArchive, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::with_capacity(archive.entry_count());
    let mut paths = Vec::with_capacity(archive.entry_count());

    for entry in archive.iter() {
        let path = output_dir.join(entry_path(&entry.name)?);
        if let Some(&first) = seen.get(&path) {
            return Err(Error::DuplicateEntryPath {
                first,
                second: entry.index(),
                path,
            });
        }
        seen.insert(path.clone(), entry.index());
        paths.push(path);
    }

    Ok(paths)
}
