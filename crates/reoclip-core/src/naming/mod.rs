//! Local file names for downloaded clips.
//!
//! Names are a pure function of the clip record, so a re-run finds the files
//! an earlier run produced.

mod sanitize;

pub use sanitize::sanitize_component;

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::clip::ClipRecord;

/// `<start as %Y%m%d_%H%M%S>_<base>.mp4`, where `<base>` is the last component
/// of the camera path without `.mp4`.
///
/// When sanitizing changes that component, a short hash of the full id is
/// appended so distinct ids cannot meet on one name; when nothing usable is
/// left the hash alone is used.
pub fn destination_file_name(clip: &ClipRecord) -> String {
    let raw = strip_mp4(base_name(&clip.id));
    let clean = sanitize_component(raw);
    let base = if clean.is_empty() {
        format!("clip_{}", id_hash(&clip.id))
    } else if clean != raw {
        format!("{}_{}", clean, id_hash(&clip.id))
    } else {
        clean
    };
    format!("{}_{}.mp4", stamp(clip), base)
}

/// Like [`destination_file_name`] but always carries the id hash. Used for
/// a clip whose plain name is already taken by another id in the same batch.
pub fn unique_file_name(clip: &ClipRecord) -> String {
    let clean = sanitize_component(strip_mp4(base_name(&clip.id)));
    let hash = id_hash(&clip.id);
    if clean.is_empty() {
        format!("{}_clip_{}.mp4", stamp(clip), hash)
    } else {
        format!("{}_{}_{}.mp4", stamp(clip), clean, hash)
    }
}

pub fn destination_path(dir: &Path, clip: &ClipRecord) -> PathBuf {
    dir.join(destination_file_name(clip))
}

fn stamp(clip: &ClipRecord) -> impl std::fmt::Display + '_ {
    clip.start.format("%Y%m%d_%H%M%S")
}

fn base_name(id: &str) -> &str {
    id.rsplit(['/', '\\']).next().unwrap_or(id)
}

fn strip_mp4(name: &str) -> &str {
    let n = name.len();
    if n >= 4 && name.is_char_boundary(n - 4) && name[n - 4..].eq_ignore_ascii_case(".mp4") {
        &name[..n - 4]
    } else {
        name
    }
}

/// First 16 hex digits of the id's SHA-256.
fn id_hash(id: &str) -> String {
    let digest = Sha256::digest(id.as_bytes());
    hex::encode(digest)[..16].to_string()
}
