//! Utility functions for hdfstools

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = "_tmp";
const TOKEN_LEN: usize = 32;

fn temp_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Sibling temporary name for a remote path: `{path}_{token}_tmp`
pub fn temp_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    format!("{}_{}{}", trimmed, temp_token(), TEMP_SUFFIX)
}

/// Sibling temporary name for a local path, in the same parent directory
/// so the final move stays a rename.
pub fn temp_local_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.components().as_path().as_os_str());
    name.push(format!("_{}{}", temp_token(), TEMP_SUFFIX));
    PathBuf::from(name)
}

/// Does this name (or path) carry the temporary suffix produced by [`temp_path`]?
pub fn is_temp_path(path: &str) -> bool {
    let Some(stem) = path.strip_suffix(TEMP_SUFFIX) else {
        return false;
    };
    let Some((_, token)) = stem.rsplit_once('_') else {
        return false;
    };
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Join a relative suffix onto a remote root. The empty suffix is the root.
pub fn join_remote(root: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return root.to_string();
    }
    let root = root.trim_end_matches('/');
    format!("{}/{}", root, suffix.trim_start_matches('/'))
}

/// Extend a walker suffix with a child name
pub fn join_suffix(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Parse duration string (e.g., "500ms", "30s", "5m")
pub fn parse_duration(s: &str) -> crate::Result<std::time::Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(crate::Error::InvalidConfig("empty duration".into()));
    }

    let (num_str, unit) = if let Some(num) = s.strip_suffix("ms") {
        (num, "ms")
    } else {
        let unit_start = s.char_indices().last().map(|(i, _)| i).unwrap_or(0);
        s.split_at(unit_start)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| crate::Error::InvalidConfig(format!("invalid duration: {}", s)))?;

    let seconds_per_unit = match unit {
        "ms" => return Ok(std::time::Duration::from_millis(num)),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => {
            return Err(crate::Error::InvalidConfig(format!(
                "unknown duration unit: {}",
                unit
            )))
        }
    };

    num.checked_mul(seconds_per_unit)
        .map(std::time::Duration::from_secs)
        .ok_or_else(|| crate::Error::InvalidConfig(format!("duration out of range: {}", s)))
}
