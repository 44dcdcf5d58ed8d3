//! Multi-select state for the displayed track list.

use std::collections::BTreeSet;

/// Direction for keyboard selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    Up,
    Down,
}

/// Selection over the currently displayed list (which may be a filtered or
/// grouped projection of the queue, with separator rows interleaved).
///
/// Implemented as a set of row indices plus anchor/focus scalars: the anchor
/// is the fixed end of a shift-range, the focus is the moving end. Separator
/// rows are never selectable, not by click, range, arrow navigation, or
/// select-all. Every operation is total: out-of-range indices are ignored
/// because the list can shrink between a gesture being queued and handled.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selected: BTreeSet<usize>,
    anchor: Option<usize>,
    focus: Option<usize>,
    separator_flags: Vec<bool>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the displayed-row shape. Any change in shape means the list
    /// identity changed (view switch, filter, grouping), which invalidates
    /// row indices, so the selection is cleared.
    pub fn set_display_rows(&mut self, separator_flags: Vec<bool>) {
        if self.separator_flags != separator_flags {
            self.separator_flags = separator_flags;
            self.clear();
        }
    }

    /// Grows or shrinks the displayed list in place without changing its
    /// identity, as happens when the queue itself mutates. New rows are plain
    /// rows; selection state pointing past the new end is dropped.
    pub fn resize_rows(&mut self, length: usize) {
        self.separator_flags.resize(length, false);
        self.selected.retain(|index| *index < length);
        if self.selected.is_empty() {
            self.anchor = None;
            self.focus = None;
            return;
        }
        if matches!(self.anchor, Some(anchor) if anchor >= length) {
            self.anchor = self.selected.iter().next().copied();
        }
        if matches!(self.focus, Some(focus) if focus >= length) {
            self.focus = self.selected.iter().next_back().copied();
        }
    }

    pub fn len(&self) -> usize {
        self.separator_flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected row indices in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
        self.focus = None;
    }

    fn is_separator(&self, index: usize) -> bool {
        self.separator_flags.get(index).copied().unwrap_or(false)
    }

    fn range_selection(&self, start: usize, end: usize) -> BTreeSet<usize> {
        let (low, high) = if start < end { (start, end) } else { (end, start) };
        (low..=high).filter(|i| !self.is_separator(*i)).collect()
    }

    fn select_single(&mut self, index: usize) {
        self.selected = BTreeSet::from([index]);
        self.anchor = Some(index);
        self.focus = Some(index);
    }

    fn toggle(&mut self, index: usize) {
        if self.selected.remove(&index) {
            if self.selected.is_empty() {
                self.anchor = None;
                self.focus = None;
                return;
            }

            if self.focus == Some(index) {
                let Some(next_focus) = self.selected.iter().next().copied() else {
                    return;
                };
                self.focus = Some(next_focus);
                let anchor_still_selected =
                    matches!(self.anchor, Some(anchor) if self.selected.contains(&anchor));
                if !anchor_still_selected {
                    self.anchor = Some(next_focus);
                }
            }
            return;
        }

        self.selected.insert(index);
        self.anchor = Some(index);
        self.focus = Some(index);
    }

    /// Handles a pointer click on row `index` with the given modifier state.
    /// Clicks on separator rows or beyond the list are ignored.
    pub fn click(&mut self, index: usize, ctrl: bool, shift: bool) {
        if index >= self.len() || self.is_separator(index) {
            return;
        }

        if shift {
            let anchor = self.anchor.unwrap_or(index);
            self.selected = self.range_selection(anchor, index);
            self.anchor = Some(anchor);
            self.focus = Some(index);
            return;
        }

        if ctrl {
            self.toggle(index);
            return;
        }

        self.select_single(index);
    }

    /// Selects every selectable row; anchor lands on the first, focus on the
    /// last.
    pub fn select_all(&mut self) {
        let selectable: BTreeSet<usize> = (0..self.len())
            .filter(|i| !self.is_separator(*i))
            .collect();

        if selectable.is_empty() {
            self.clear();
            return;
        }

        self.anchor = selectable.iter().next().copied();
        self.focus = selectable.iter().next_back().copied();
        self.selected = selectable;
    }

    /// Moves the focus one row up or down, wrapping at either end of the
    /// list and skipping separator rows. With shift held and an anchor
    /// present this extends the range; otherwise it collapses to a single
    /// selection at the new focus.
    pub fn move_focus(&mut self, direction: SelectionDirection, shift: bool) {
        let length = self.len();
        if length == 0 {
            return;
        }

        let base = self.focus.or(match direction {
            SelectionDirection::Up => self.selected.iter().next().copied(),
            SelectionDirection::Down => self.selected.iter().next_back().copied(),
        });

        let advance = |index: usize| match direction {
            SelectionDirection::Up => {
                if index == 0 {
                    length - 1
                } else {
                    index - 1
                }
            }
            SelectionDirection::Down => {
                if index + 1 >= length {
                    0
                } else {
                    index + 1
                }
            }
        };

        let mut next = match (direction, base) {
            (_, Some(base)) => advance(base.min(length - 1)),
            // Nothing focused or selected yet: Down starts at the top, Up
            // wraps straight to the bottom.
            (SelectionDirection::Down, None) => 0,
            (SelectionDirection::Up, None) => length - 1,
        };

        let mut remaining = length;
        while self.is_separator(next) {
            remaining -= 1;
            if remaining == 0 {
                return;
            }
            next = advance(next);
        }

        match self.anchor {
            Some(anchor) if shift => {
                self.selected = self.range_selection(anchor, next);
                self.focus = Some(next);
            }
            _ => self.select_single(next),
        }
    }

    /// Returns the selected indices (ascending) and clears the selection.
    /// Used by delete-selected: the caller removes the underlying items.
    pub fn take_for_delete(&mut self) -> Vec<usize> {
        let indices = self.selected_indices();
        self.clear();
        indices
    }

    /// Remaps selection, anchor, and focus after a single-row reorder from
    /// `from` to the gap position `to`, so the same rows stay highlighted.
    pub fn sync_after_reorder(&mut self, from: usize, to: usize) {
        let length = self.len();
        if length == 0 || self.selected.is_empty() {
            return;
        }

        let bounded_from = from.min(length - 1);
        let bounded_target = to.min(length);
        if bounded_from == bounded_target || bounded_from + 1 == bounded_target {
            return;
        }

        let moving_down = bounded_from < bounded_target;
        let final_index = if moving_down {
            (bounded_target - 1).min(length - 1)
        } else {
            bounded_target.min(length - 1)
        };

        let adjust = |index: usize| -> usize {
            if index == bounded_from {
                final_index
            } else if moving_down && index > bounded_from && index < bounded_target {
                index - 1
            } else if !moving_down && index >= bounded_target && index < bounded_from {
                index + 1
            } else {
                index
            }
        };

        self.selected = self.selected.iter().map(|index| adjust(*index)).collect();
        self.anchor = self.anchor.map(adjust);
        self.focus = self.focus.map(adjust);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(flags: &[bool]) -> SelectionModel {
        let mut model = SelectionModel::new();
        model.set_display_rows(flags.to_vec());
        model
    }

    fn plain_rows(count: usize) -> SelectionModel {
        model(&vec![false; count])
    }

    #[test]
    fn test_plain_click_selects_single_row() {
        let mut selection = plain_rows(5);
        selection.click(2, false, false);
        assert_eq!(selection.selected_indices(), vec![2]);
        assert_eq!(selection.anchor(), Some(2));
        assert_eq!(selection.focus(), Some(2));
    }

    #[test]
    fn test_shift_click_selects_closed_range() {
        let mut selection = plain_rows(8);
        selection.click(2, false, false);
        selection.click(5, false, true);
        assert_eq!(selection.selected_indices(), vec![2, 3, 4, 5]);
        assert_eq!(selection.anchor(), Some(2));
        assert_eq!(selection.focus(), Some(5));
    }

    #[test]
    fn test_shift_click_without_anchor_anchors_at_click() {
        let mut selection = plain_rows(5);
        selection.click(3, false, true);
        assert_eq!(selection.selected_indices(), vec![3]);
        assert_eq!(selection.anchor(), Some(3));
    }

    #[test]
    fn test_range_then_toggle_removes_inner_row() {
        let mut selection = plain_rows(8);
        selection.click(2, false, false);
        selection.click(5, false, true);
        selection.click(3, true, false);
        assert_eq!(selection.selected_indices(), vec![2, 4, 5]);
        assert_eq!(selection.focus(), Some(5));
    }

    #[test]
    fn test_toggle_off_focus_moves_focus_to_minimum() {
        let mut selection = plain_rows(8);
        selection.click(2, true, false);
        selection.click(5, true, false);
        assert_eq!(selection.focus(), Some(5));

        selection.click(5, true, false);
        assert_eq!(selection.selected_indices(), vec![2]);
        assert_eq!(selection.focus(), Some(2));
        assert_eq!(selection.anchor(), Some(2));
    }

    #[test]
    fn test_toggle_last_row_off_resets_anchor_and_focus() {
        let mut selection = plain_rows(4);
        selection.click(1, true, false);
        selection.click(1, true, false);
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
        assert_eq!(selection.focus(), None);
    }

    #[test]
    fn test_shift_range_skips_separator_rows() {
        let mut selection = model(&[true, false, false, true, false]);
        selection.click(1, false, false);
        selection.click(4, false, true);
        assert_eq!(selection.selected_indices(), vec![1, 2, 4]);
    }

    #[test]
    fn test_select_all_excludes_separators() {
        let mut selection = model(&[true, false, false, true, false]);
        selection.select_all();
        assert_eq!(selection.selected_indices(), vec![1, 2, 4]);
        assert_eq!(selection.anchor(), Some(1));
        assert_eq!(selection.focus(), Some(4));
    }

    #[test]
    fn test_click_on_separator_is_ignored() {
        let mut selection = model(&[true, false, false]);
        selection.click(0, false, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_out_of_range_click_is_ignored() {
        let mut selection = plain_rows(3);
        selection.click(7, false, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_arrow_down_moves_and_wraps() {
        let mut selection = plain_rows(3);
        selection.move_focus(SelectionDirection::Down, false);
        assert_eq!(selection.selected_indices(), vec![0]);

        selection.move_focus(SelectionDirection::Down, false);
        selection.move_focus(SelectionDirection::Down, false);
        assert_eq!(selection.selected_indices(), vec![2]);

        selection.move_focus(SelectionDirection::Down, false);
        assert_eq!(selection.selected_indices(), vec![0]);
    }

    #[test]
    fn test_arrow_up_from_top_wraps_to_bottom() {
        let mut selection = plain_rows(4);
        selection.click(0, false, false);
        selection.move_focus(SelectionDirection::Up, false);
        assert_eq!(selection.selected_indices(), vec![3]);
    }

    #[test]
    fn test_arrow_navigation_skips_separators() {
        let mut selection = model(&[false, true, false]);
        selection.click(0, false, false);
        selection.move_focus(SelectionDirection::Down, false);
        assert_eq!(selection.selected_indices(), vec![2]);
    }

    #[test]
    fn test_shift_arrow_extends_range_from_anchor() {
        let mut selection = plain_rows(6);
        selection.click(2, false, false);
        selection.move_focus(SelectionDirection::Down, true);
        selection.move_focus(SelectionDirection::Down, true);
        assert_eq!(selection.selected_indices(), vec![2, 3, 4]);
        assert_eq!(selection.anchor(), Some(2));
        assert_eq!(selection.focus(), Some(4));
    }

    #[test]
    fn test_move_focus_on_empty_list_is_a_no_op() {
        let mut selection = plain_rows(0);
        selection.move_focus(SelectionDirection::Down, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_take_for_delete_returns_sorted_and_clears() {
        let mut selection = plain_rows(6);
        selection.click(4, true, false);
        selection.click(1, true, false);
        assert_eq!(selection.take_for_delete(), vec![1, 4]);
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
    }

    #[test]
    fn test_display_rows_change_clears_selection() {
        let mut selection = plain_rows(4);
        selection.click(1, false, false);
        selection.set_display_rows(vec![false; 7]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_same_display_rows_keep_selection() {
        let mut selection = plain_rows(4);
        selection.click(1, false, false);
        selection.set_display_rows(vec![false; 4]);
        assert_eq!(selection.selected_indices(), vec![1]);
    }

    #[test]
    fn test_resize_keeps_in_range_selection() {
        let mut selection = plain_rows(6);
        selection.click(1, true, false);
        selection.click(4, true, false);
        selection.resize_rows(3);
        assert_eq!(selection.selected_indices(), vec![1]);
        assert_eq!(selection.focus(), Some(1));

        selection.resize_rows(8);
        assert_eq!(selection.selected_indices(), vec![1]);
    }

    #[test]
    fn test_resize_to_empty_clears_everything() {
        let mut selection = plain_rows(3);
        selection.click(2, false, false);
        selection.resize_rows(0);
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
        assert_eq!(selection.focus(), None);
    }

    #[test]
    fn test_sync_after_reorder_moving_down() {
        let mut selection = plain_rows(5);
        selection.click(1, false, false);
        // Row 1 dragged to the gap below row 3.
        selection.sync_after_reorder(1, 4);
        assert_eq!(selection.selected_indices(), vec![3]);
        assert_eq!(selection.anchor(), Some(3));
        assert_eq!(selection.focus(), Some(3));
    }

    #[test]
    fn test_sync_after_reorder_shifts_intervening_rows() {
        let mut selection = plain_rows(5);
        selection.click(2, true, false);
        selection.click(3, true, false);
        // Row 4 dragged above row 1: rows 1..=3 shift down by one.
        selection.sync_after_reorder(4, 1);
        assert_eq!(selection.selected_indices(), vec![3, 4]);
    }
}
