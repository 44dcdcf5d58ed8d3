//! Currently-playing position tracking and index repair.

use crate::queue::Queue;
use crate::track::LocalTrack;

/// How a removal affected the tracked position.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalImpact {
    /// Nothing playing, or every removed slot was after the current one.
    Unaffected,
    /// The current entry survived but its index shifted left.
    Shifted,
    /// The playing entry itself was removed. `landing` is the index now
    /// occupying its place, or `None` when the queue emptied out.
    CurrentRemoved { landing: Option<usize> },
}

/// Keeps `current_index` and the denormalized `current_track` cache valid
/// while the queue mutates underneath it.
///
/// Every queue mutation must be followed by the matching repair call before
/// any observer reads the position again. Insert and removal repairs are
/// index arithmetic; move repair relocates the current slot by entry id,
/// which sidesteps the off-by-one traps of treating a move as
/// remove-then-insert.
#[derive(Debug, Clone, Default)]
pub struct PlaybackPosition {
    current_index: Option<usize>,
    current_entry_id: Option<String>,
    current_track: Option<LocalTrack>,
}

impl PlaybackPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_entry_id(&self) -> Option<&str> {
        self.current_entry_id.as_deref()
    }

    pub fn current_track(&self) -> Option<&LocalTrack> {
        self.current_track.as_ref()
    }

    /// Resets to the nothing-playing state.
    pub fn clear(&mut self) {
        self.current_index = None;
        self.current_entry_id = None;
        self.current_track = None;
    }

    /// Points the position at `index` in `queue`, clamped to the last entry.
    /// Clears instead when the queue is empty. Returns the index actually
    /// selected.
    pub fn set_current(&mut self, queue: &Queue, index: usize) -> Option<usize> {
        if queue.is_empty() {
            self.clear();
            return None;
        }

        let target = index.min(queue.len() - 1);
        let entry = queue.entry(target)?;
        self.current_index = Some(target);
        self.current_entry_id = Some(entry.entry_id.clone());
        self.current_track = Some(entry.track.clone());
        Some(target)
    }

    /// Repair step after inserting `count` entries at `insert_index`:
    /// insertion at or before the current slot shifts it right.
    pub fn note_insert(&mut self, insert_index: usize, count: usize) {
        if let Some(current) = self.current_index {
            if insert_index <= current {
                self.current_index = Some(current + count);
            }
        }
    }

    /// Repair step after removing the slots at `removed` (original indices,
    /// ascending). When the current entry itself was removed the position is
    /// cleared and the caller decides what to do with the returned landing
    /// index.
    pub fn note_remove(&mut self, removed: &[usize], remaining_len: usize) -> RemovalImpact {
        let current = match self.current_index {
            Some(current) => current,
            None => return RemovalImpact::Unaffected,
        };

        let removed_before = removed.iter().filter(|index| **index < current).count();

        if removed.contains(&current) {
            self.clear();
            let landing = if remaining_len == 0 {
                None
            } else {
                Some((current - removed_before).min(remaining_len - 1))
            };
            return RemovalImpact::CurrentRemoved { landing };
        }

        if removed_before == 0 {
            return RemovalImpact::Unaffected;
        }
        self.current_index = Some(current - removed_before);
        RemovalImpact::Shifted
    }

    /// Repair step after a reorder: relocate the current slot by identity.
    /// Falls back to clamping the stale index when the id is gone.
    pub fn repair_after_move(&mut self, queue: &Queue) {
        let Some(current) = self.current_index else {
            return;
        };

        if let Some(entry_id) = self.current_entry_id.as_deref() {
            if let Some(index) = queue.index_of_entry(entry_id) {
                self.current_index = Some(index);
                return;
            }
        }

        if queue.is_empty() {
            self.clear();
        } else {
            self.current_index = Some(current.min(queue.len() - 1));
        }
    }

    /// Index of the next track to play, or `None` at the end of the queue.
    /// `wrap` is the repeat-all policy supplied by the caller.
    pub fn step_next(&self, queue_len: usize, wrap: bool) -> Option<usize> {
        if queue_len == 0 {
            return None;
        }
        match self.current_index {
            None => Some(0),
            Some(current) if current + 1 < queue_len => Some(current + 1),
            Some(_) if wrap => Some(0),
            Some(_) => None,
        }
    }

    /// Index of the previous track to play, or `None` at the start.
    pub fn step_previous(&self, queue_len: usize, wrap: bool) -> Option<usize> {
        if queue_len == 0 {
            return None;
        }
        match self.current_index {
            Some(current) if current > 0 => Some(current - 1),
            Some(_) if wrap => Some(queue_len - 1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn track(id: &str) -> LocalTrack {
        LocalTrack {
            id: id.to_string(),
            file_path: PathBuf::from(format!("/music/{}.mp3", id)),
            file_name: format!("{}.mp3", id),
            title: format!("Track {}", id),
            artist: "Test Artist".to_string(),
            album: None,
            duration: "1:00".to_string(),
            thumbnail: None,
        }
    }

    fn queue_of(ids: &[&str]) -> Queue {
        let mut queue = Queue::new();
        queue.append(ids.iter().map(|id| track(id)).collect());
        queue
    }

    #[test]
    fn test_insert_before_current_shifts_index_right() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 1);

        let at = queue.insert_at(1, vec![track("mid")]);
        position.note_insert(at, 1);

        assert_eq!(queue.len(), 4);
        assert_eq!(position.current_index(), Some(2));
        assert_eq!(position.current_track().unwrap().id, "b");
    }

    #[test]
    fn test_insert_after_current_leaves_index_alone() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 1);

        let at = queue.insert_at(3, vec![track("after")]);
        position.note_insert(at, 1);

        assert_eq!(position.current_index(), Some(1));
    }

    #[test]
    fn test_remove_before_current_shifts_index_left() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 2);

        let doomed = vec![queue.entry(0).unwrap().entry_id.clone()];
        let removed = queue.remove_entries(&doomed);
        let impact = position.note_remove(&removed, queue.len());

        assert_eq!(impact, RemovalImpact::Shifted);
        assert_eq!(position.current_index(), Some(1));
    }

    #[test]
    fn test_remove_current_lands_on_successor() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 1);

        let doomed = vec![queue.entry(1).unwrap().entry_id.clone()];
        let removed = queue.remove_entries(&doomed);
        let impact = position.note_remove(&removed, queue.len());

        assert_eq!(impact, RemovalImpact::CurrentRemoved { landing: Some(1) });
        assert_eq!(position.current_index(), None);
    }

    #[test]
    fn test_remove_last_remaining_entry_clears_landing() {
        let mut queue = queue_of(&["a"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 0);

        let doomed = vec![queue.entry(0).unwrap().entry_id.clone()];
        let removed = queue.remove_entries(&doomed);
        let impact = position.note_remove(&removed, queue.len());

        assert_eq!(impact, RemovalImpact::CurrentRemoved { landing: None });
        assert!(position.current_track().is_none());
    }

    #[test]
    fn test_remove_current_at_tail_lands_on_new_tail() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 2);

        let doomed = vec![queue.entry(2).unwrap().entry_id.clone()];
        let removed = queue.remove_entries(&doomed);
        let impact = position.note_remove(&removed, queue.len());

        assert_eq!(impact, RemovalImpact::CurrentRemoved { landing: Some(1) });
    }

    #[test]
    fn test_move_repair_follows_entry_identity() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 1);

        queue.move_entry(1, 4);
        position.repair_after_move(&queue);

        assert_eq!(position.current_index(), Some(3));
        assert_eq!(position.current_track().unwrap().id, "b");
    }

    #[test]
    fn test_move_of_other_entry_still_repairs_current() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let mut position = PlaybackPosition::new();
        position.set_current(&queue, 2);

        // Dragging "a" below "c" shifts the current entry left.
        queue.move_entry(0, 3);
        position.repair_after_move(&queue);

        assert_eq!(position.current_index(), Some(1));
        assert_eq!(position.current_track().unwrap().id, "c");
    }

    #[test]
    fn test_set_current_clamps_to_last_entry() {
        let queue = queue_of(&["a", "b"]);
        let mut position = PlaybackPosition::new();
        assert_eq!(position.set_current(&queue, 9), Some(1));
        assert_eq!(position.current_track().unwrap().id, "b");
    }

    #[test]
    fn test_set_current_on_empty_queue_clears() {
        let queue = Queue::new();
        let mut position = PlaybackPosition::new();
        assert_eq!(position.set_current(&queue, 0), None);
        assert_eq!(position.current_index(), None);
        assert!(position.current_track().is_none());
    }

    #[test]
    fn test_step_next_bounded_and_wrapping() {
        let queue = queue_of(&["a", "b"]);
        let mut position = PlaybackPosition::new();
        assert_eq!(position.step_next(queue.len(), false), Some(0));

        position.set_current(&queue, 1);
        assert_eq!(position.step_next(queue.len(), false), None);
        assert_eq!(position.step_next(queue.len(), true), Some(0));
    }

    #[test]
    fn test_step_previous_bounded_and_wrapping() {
        let queue = queue_of(&["a", "b"]);
        let mut position = PlaybackPosition::new();
        assert_eq!(position.step_previous(queue.len(), false), None);

        position.set_current(&queue, 0);
        assert_eq!(position.step_previous(queue.len(), false), None);
        assert_eq!(position.step_previous(queue.len(), true), Some(1));
    }
}
