//! De-duplication pass applied to tracks dropped or pasted into the queue.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::track::{LocalTrack, QueueEntry};

/// Result of a dedup pass: the tracks to actually insert, in their original
/// order, plus how many incoming tracks were dropped as duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub filtered: Vec<LocalTrack>,
    pub skipped: usize,
}

/// Filters an incoming batch against the queue, keyed on file path.
///
/// A track already queued (same `file_path`) is skipped, and so is a second
/// occurrence of the same path within the batch itself. Tracks with an empty
/// `id` or `file_path` cannot be identified reliably, so they always pass
/// through: they are neither excluded nor used as dedup keys.
pub fn filter_tracks_for_insert(
    existing_queue: &[QueueEntry],
    incoming_tracks: Vec<LocalTrack>,
) -> FilterOutcome {
    let existing_paths: HashSet<&PathBuf> = existing_queue
        .iter()
        .filter(|entry| !entry.track.id.is_empty() && !entry.track.file_path.as_os_str().is_empty())
        .map(|entry| &entry.track.file_path)
        .collect();

    let mut seen_in_batch: HashSet<PathBuf> = HashSet::new();
    let mut filtered = Vec::with_capacity(incoming_tracks.len());
    let mut skipped = 0;

    for track in incoming_tracks {
        if track.id.is_empty() || track.file_path.as_os_str().is_empty() {
            filtered.push(track);
            continue;
        }

        if existing_paths.contains(&track.file_path) || seen_in_batch.contains(&track.file_path) {
            skipped += 1;
            continue;
        }

        seen_in_batch.insert(track.file_path.clone());
        filtered.push(track);
    }

    FilterOutcome { filtered, skipped }
}
