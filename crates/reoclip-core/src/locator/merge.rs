//! Ordered merge of per-day results with id deduplication.

use std::collections::HashSet;

use crate::clip::ClipRecord;

/// Flattens per-slice batches into one list sorted by `(start, id)`, keeping
/// only the first occurrence of each id. Batches are given in slice order, so
/// among equal entries the earlier slice wins.
pub fn merge_clips<I>(batches: I) -> Vec<ClipRecord>
where
    I: IntoIterator<Item = Vec<ClipRecord>>,
{
    let mut all: Vec<ClipRecord> = batches.into_iter().flatten().collect();
    // Stable: ties keep slice order.
    all.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let mut seen: HashSet<String> = HashSet::with_capacity(all.len());
    all.retain(|clip| seen.insert(clip.id.clone()));
    all
}
