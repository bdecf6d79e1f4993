//! Clip files on disk.
//!
//! A download writes into `<destination>.part` (preallocated from the size
//! hint when the camera gave one) and is renamed into place only once the
//! transfer finished. A failed transfer discards its temp file.

mod builder;
mod writer;

pub use builder::ClipFileBuilder;
pub use writer::ClipFile;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.mp4` → `a.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True when `path` holds a finished clip: exists, and matches `size_hint`
/// when one is known.
pub fn is_complete(path: &Path, size_hint: Option<u64>) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => size_hint.map_or(true, |n| meta.len() == n),
        _ => false,
    }
}
