//! Gesture-to-queue-action resolution.

/// Modifier bit for shift in a raw modifier mask.
pub const MODIFIER_SHIFT: u32 = 1 << 0;
/// Modifier bit for ctrl in a raw modifier mask.
pub const MODIFIER_CTRL: u32 = 1 << 1;
/// Modifier bit for cmd/meta in a raw modifier mask.
pub const MODIFIER_META: u32 = 1 << 2;

/// Semantic effect of a user gesture on the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    /// Append to the end of the queue.
    Enqueue,
    /// Insert immediately after the current track.
    PlayNext,
    /// Insert at the current position and start playing.
    PlayNow,
}

/// Modifier information carried by a gesture, as much of it as the source
/// provides. Some gesture sources report a decoded shift flag, others only a
/// raw modifier bitmask, and some (e.g. native drag payloads) report nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureEvent {
    /// Decoded shift state, when the event source exposes one.
    pub shift_key: Option<bool>,
    /// Raw modifier bitmask (`MODIFIER_*` bits), when available.
    pub modifier_mask: Option<u32>,
}

impl GestureEvent {
    pub fn with_shift(shift: bool) -> Self {
        Self {
            shift_key: Some(shift),
            modifier_mask: None,
        }
    }

    pub fn with_modifier_mask(mask: u32) -> Self {
        Self {
            shift_key: None,
            modifier_mask: Some(mask),
        }
    }

    fn shift_signaled(&self) -> bool {
        if self.shift_key == Some(true) {
            return true;
        }
        matches!(self.modifier_mask, Some(mask) if mask & MODIFIER_SHIFT != 0)
    }
}

/// Resolves a gesture to its queue action.
///
/// Precedence: an explicit shift signal on the event wins, then the ambient
/// shift-held state maintained by the global keyboard listener (some gesture
/// sources carry no modifier info at all), then the call site's fallback,
/// then plain enqueue.
pub fn resolve_queue_action(
    event: Option<&GestureEvent>,
    shift_held: bool,
    fallback: Option<QueueAction>,
) -> QueueAction {
    if let Some(event) = event {
        if event.shift_signaled() {
            return QueueAction::PlayNext;
        }
    }

    if shift_held {
        return QueueAction::PlayNext;
    }

    fallback.unwrap_or(QueueAction::Enqueue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_shift_flag_wins_over_fallback() {
        let event = GestureEvent::with_shift(true);
        let action = resolve_queue_action(Some(&event), false, Some(QueueAction::Enqueue));
        assert_eq!(action, QueueAction::PlayNext);
    }

    #[test]
    fn test_shift_bit_in_modifier_mask_resolves_play_next() {
        let event = GestureEvent::with_modifier_mask(MODIFIER_SHIFT | MODIFIER_META);
        let action = resolve_queue_action(Some(&event), false, None);
        assert_eq!(action, QueueAction::PlayNext);
    }

    #[test]
    fn test_non_shift_modifiers_do_not_trigger_play_next() {
        let event = GestureEvent::with_modifier_mask(MODIFIER_CTRL | MODIFIER_META);
        let action = resolve_queue_action(Some(&event), false, None);
        assert_eq!(action, QueueAction::Enqueue);
    }

    #[test]
    fn test_ambient_shift_used_when_event_has_no_modifier_info() {
        let event = GestureEvent::default();
        let action = resolve_queue_action(Some(&event), true, Some(QueueAction::PlayNow));
        assert_eq!(action, QueueAction::PlayNext);
    }

    #[test]
    fn test_event_shift_false_does_not_block_ambient_shift() {
        // An event that reports shift=false is still overridden by the held
        // key: drag payloads deliver stale modifier snapshots.
        let event = GestureEvent::with_shift(false);
        let action = resolve_queue_action(Some(&event), true, None);
        assert_eq!(action, QueueAction::PlayNext);
    }

    #[test]
    fn test_fallback_applies_without_any_shift_signal() {
        let action = resolve_queue_action(None, false, Some(QueueAction::PlayNow));
        assert_eq!(action, QueueAction::PlayNow);
    }

    #[test]
    fn test_defaults_to_enqueue() {
        let action = resolve_queue_action(None, false, None);
        assert_eq!(action, QueueAction::Enqueue);
    }
}
