//! Event-bus protocol shared by all runtime components.
//!
//! This module defines all message payloads exchanged between the queue
//! manager, the renderer, the native engine bridge, and the global input
//! listener.

use std::path::PathBuf;

use crate::config::Config;
use crate::queue_actions::{GestureEvent, QueueAction};
use crate::selection::SelectionDirection;
use crate::track::{LocalTrack, QueueEntry};

/// Repeat behavior applied when stepping past either end of the queue.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum RepeatMode {
    Off, // Stop after reaching the end of the queue
    All, // Wrap around to the other end
}

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    Queue(QueueMessage),
    Playback(PlaybackMessage),
    Engine(EngineMessage),
    Input(InputMessage),
    Config(ConfigMessage),
}

/// Queue-domain commands and notifications.
#[derive(Debug, Clone)]
pub enum QueueMessage {
    /// Insert tracks at a position (clamped). With `play_immediately`, jump
    /// to the first inserted entry and start playback.
    InsertTracks {
        index: usize,
        tracks: Vec<LocalTrack>,
        play_immediately: bool,
    },
    /// Append tracks at the end. Appending to an empty queue starts playback
    /// of the first appended track.
    AppendTracks(Vec<LocalTrack>),
    /// Atomically swap the whole queue and jump to `start_index`.
    ReplaceTracks {
        tracks: Vec<LocalTrack>,
        start_index: Option<usize>,
        play_immediately: bool,
    },
    /// Remove slots by entry id. Unknown ids are ignored.
    RemoveEntries(Vec<String>),
    /// Drag-reorder one entry to a gap position (`0..=len`).
    MoveEntry { from: usize, to: usize },
    Clear,
    /// Tracks dropped onto the queue at a gap position. The batch runs
    /// through the dedup filter before insertion.
    DropTracks {
        tracks: Vec<LocalTrack>,
        position: usize,
    },
    /// Tracks sent to the queue by click/double-click/context-menu. The
    /// queue action resolver decides where they land.
    EnqueueGesture {
        tracks: Vec<LocalTrack>,
        event: Option<GestureEvent>,
        fallback: Option<QueueAction>,
    },
    SelectTrackMulti {
        index: usize,
        ctrl: bool,
        shift: bool,
    },
    DeselectAll,
    SelectAll,
    MoveSelection {
        direction: SelectionDirection,
        shift: bool,
    },
    /// Remove the selected rows' queue entries, then clear the selection.
    DeleteSelected,
    /// The renderer swapped the displayed list (view switch, filter,
    /// grouping). Flags mark separator rows, which are never selectable.
    DisplayListChanged { separator_flags: Vec<bool> },
    ToggleRepeat,
    RepeatModeChanged(RepeatMode),
    /// Broadcast after every queue/position mutation completes.
    QueueChanged(QueueSnapshot),
    SelectionChanged(Vec<usize>),
    /// Dedup outcome of a drop/enqueue batch, for toast display.
    TracksSkipped { inserted: usize, skipped: usize },
}

/// Consistent view of queue and position state, published as one unit so no
/// observer can see an insert without its index repair.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub entries: Vec<QueueEntry>,
    pub current_index: Option<usize>,
    pub current_track: Option<LocalTrack>,
    pub is_playing: bool,
    pub repeat_mode: RepeatMode,
    /// Most recent load failure, cleared on the next successful load.
    pub error: Option<String>,
}

/// Playback transport commands and native-engine events.
#[derive(Debug, Clone)]
pub enum PlaybackMessage {
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    Next,
    Previous,
    PlayTrackAtIndex(usize),
    Seek(f64),
    SetVolume(f32),
    /// Engine finished loading the track for `entry_id`. Events for entries
    /// that are no longer current are discarded.
    LoadSucceeded {
        entry_id: String,
        duration_secs: f64,
    },
    LoadFailed {
        entry_id: String,
        error: String,
    },
    StateChanged {
        is_playing: bool,
    },
    Progress {
        current_secs: f64,
        duration_secs: f64,
    },
    /// The current track played to its end.
    Completed,
}

/// Commands consumed by the native playback engine bridge.
#[derive(Debug, Clone)]
pub enum EngineMessage {
    LoadTrack {
        entry_id: String,
        path: PathBuf,
        autoplay: bool,
    },
    Play,
    Pause,
    Stop,
    Seek(f64),
    SetVolume(f32),
}

/// Events from the global keyboard listener.
#[derive(Debug, Clone)]
pub enum InputMessage {
    /// Modifier keys changed. The queue manager keeps the shift flag as the
    /// ambient fallback for gesture sources without modifier info.
    ModifiersChanged {
        shift: bool,
        ctrl: bool,
        meta: bool,
    },
}

/// Runtime configuration updates.
#[derive(Debug, Clone)]
pub enum ConfigMessage {
    ConfigChanged(Config),
}
