//! Local filesystem side of a transfer

use crate::common::Result;
use crate::protocol::{EntryType, ListResult};
use std::fs;
use std::io;
use std::path::Path;

/// Kind of a local path, `None` if it does not exist or is neither a
/// regular file nor a directory.
pub fn entry_type(path: &Path) -> Result<Option<EntryType>> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(if metadata.is_dir() {
        Some(EntryType::Directory)
    } else if metadata.is_file() {
        Some(EntryType::File)
    } else {
        None
    })
}

/// Does anything (including a dangling symlink) sit at `path`?
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Immediate children of a local directory, sorted by name
pub fn list_dir(path: &Path) -> Result<ListResult> {
    let mut result = ListResult::default();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!(dir = %path.display(), name = ?raw, "Skipping non UTF-8 name");
                continue;
            }
        };
        if file_type.is_dir() {
            result.dirs.push(name);
        } else if file_type.is_file() {
            result.files.push(name);
        } else {
            tracing::warn!(dir = %path.display(), name = %name, "Skipping special file");
        }
    }
    result.dirs.sort();
    result.files.sort();
    Ok(result)
}

/// Remove whatever is at `path`. Missing paths are fine.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Best-effort [`remove_path`] for cleanup paths that must not mask the
/// original outcome
pub fn discard(path: &Path) {
    if let Err(e) = remove_path(path) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary data");
    }
}
