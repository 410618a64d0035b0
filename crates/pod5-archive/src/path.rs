//! Mapping between archive entry names and filesystem paths.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Suffix appended to the archive stem for the rebuilt archive.
pub const REBUILT_SUFFIX: &str = "_new.pod";

/// Suffix appended to the archive stem for the default extraction folder.
pub const EXTRACTED_SUFFIX: &str = "_extracted";

/// Turn an entry name into a relative path below the extraction root.
///
/// Both `/` and `\` separate components. Empty and `.` components are
/// dropped, and `..` or drive-prefixed components are refused so no entry can
/// land outside the root.
pub fn entry_path(name: &str) -> Result<PathBuf> {
    let mut out = PathBuf::new();

    for component in name.split(['/', '\\']) {
        match component {
            "" | "." => continue,
            ".." => return Err(Error::UnsafeEntryName(name.to_string())),
            c if c.contains(':') => return Err(Error::UnsafeEntryName(name.to_string())),
            c => out.push(c),
        }
    }

    if out.as_os_str().is_empty() {
        return Err(Error::UnsafeEntryName(name.to_string()));
    }

    Ok(out)
}

/// `<dir>/<stem>_new.pod` for an archive at `<dir>/<stem>.<ext>`.
pub fn rebuilt_archive_path(original: &Path) -> PathBuf {
    sibling_with_suffix(original, REBUILT_SUFFIX)
}

/// `<dir>/<stem>_extracted` for an archive at `<dir>/<stem>.<ext>`.
pub fn default_extract_dir(archive: &Path) -> PathBuf {
    sibling_with_suffix(archive, EXTRACTED_SUFFIX)
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
