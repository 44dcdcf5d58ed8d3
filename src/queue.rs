//! Ordered play queue with stable per-slot identity.

use crate::track::{LocalTrack, QueueEntry};

/// The authoritative ordered list of entries to be played.
///
/// All index arguments are tolerated rather than validated: insert positions
/// are clamped to `[0, len]`, move targets to the valid gap range, and
/// unknown entry ids are ignored. Callers routinely hold indices computed
/// against a since-mutated list, and the queue must stay consistent anyway.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    entries: Vec<QueueEntry>,
}

impl Queue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    /// Finds the current index of a slot by its entry id.
    pub fn index_of_entry(&self, entry_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.entry_id == entry_id)
    }

    /// Inserts tracks at `index` (clamped to `[0, len]`), wrapping each in a
    /// fresh queue slot. Returns the position actually used.
    pub fn insert_at(&mut self, index: usize, tracks: Vec<LocalTrack>) -> usize {
        let position = index.min(self.entries.len());
        let additions = tracks.into_iter().map(QueueEntry::new);
        self.entries.splice(position..position, additions);
        position
    }

    /// Appends tracks at the end. Returns the index of the first appended
    /// entry.
    pub fn append(&mut self, tracks: Vec<LocalTrack>) -> usize {
        self.insert_at(self.entries.len(), tracks)
    }

    /// Atomically replaces the whole queue. Every entry gets a fresh slot id.
    pub fn replace(&mut self, tracks: Vec<LocalTrack>) {
        self.entries = tracks.into_iter().map(QueueEntry::new).collect();
    }

    /// Removes slots by entry id. Unknown ids are a no-op. Returns the
    /// original indices of the removed slots in ascending order, which the
    /// position tracker needs before the indices go stale.
    pub fn remove_entries(&mut self, entry_ids: &[String]) -> Vec<usize> {
        let removed_indices: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry_ids.iter().any(|id| *id == entry.entry_id))
            .map(|(index, _)| index)
            .collect();

        for index in removed_indices.iter().rev() {
            self.entries.remove(*index);
        }
        removed_indices
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reorders a single entry from `from` to the gap position `to`
    /// (`0..=len`, as produced by drop-gap hit testing). The slot id travels
    /// with the entry. Returns whether the queue changed.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let length = self.entries.len();
        if length == 0 || from >= length {
            return false;
        }

        let bounded_target = to.min(length);
        // Dropping an entry into the gap on either side of itself is a no-op.
        if from == bounded_target || from + 1 == bounded_target {
            return false;
        }

        let moved = self.entries.remove(from);
        let insert_index = if from < bounded_target {
            bounded_target - 1
        } else {
            bounded_target
        };
        self.entries.insert(insert_index.min(self.entries.len()), moved);
        true
    }
}
