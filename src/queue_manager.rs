//! Owner of the play queue, playback position, and selection state.
//!
//! All mutation requests arrive over the bus and are handled on a single
//! thread, so every observer sees each mutation and its position repair as
//! one atomic `QueueChanged` snapshot.

use log::{debug, error, info, trace};
use tokio::sync::broadcast::{Receiver, Sender};

use crate::config::{self, Config, StartupRepeatMode};
use crate::drop_filter::filter_tracks_for_insert;
use crate::position::{PlaybackPosition, RemovalImpact};
use crate::protocol;
use crate::queue::Queue;
use crate::queue_actions::{resolve_queue_action, GestureEvent, QueueAction};
use crate::selection::{SelectionDirection, SelectionModel};
use crate::track::LocalTrack;

pub struct QueueManager {
    queue: Queue,
    position: PlaybackPosition,
    selection: SelectionModel,
    repeat_mode: protocol::RepeatMode,
    is_playing: bool,
    volume: f32,
    /// Most recent load failure, surfaced in snapshots until the next
    /// successful load.
    error: Option<String>,
    /// Ambient shift state from the global keyboard listener, the fallback
    /// for gesture sources that carry no modifier info.
    shift_held: bool,
    bus_consumer: Receiver<protocol::Message>,
    bus_producer: Sender<protocol::Message>,
}

impl QueueManager {
    pub fn new(
        bus_consumer: Receiver<protocol::Message>,
        bus_producer: Sender<protocol::Message>,
        config: &Config,
    ) -> Self {
        let repeat_mode = match config.playback.repeat_mode {
            StartupRepeatMode::Off => protocol::RepeatMode::Off,
            StartupRepeatMode::All => protocol::RepeatMode::All,
        };

        Self {
            queue: Queue::new(),
            position: PlaybackPosition::new(),
            selection: SelectionModel::new(),
            repeat_mode,
            is_playing: false,
            volume: config.playback.volume,
            error: None,
            shift_held: false,
            bus_consumer,
            bus_producer,
        }
    }

    pub fn run(&mut self) {
        info!(
            "QueueManager: starting. volume={} repeat={:?}",
            self.volume, self.repeat_mode
        );
        self.broadcast_queue_changed();

        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(message) => match message {
                    protocol::Message::Queue(queue_message) => {
                        self.handle_queue_message(queue_message)
                    }
                    protocol::Message::Playback(playback_message) => {
                        self.handle_playback_message(playback_message)
                    }
                    protocol::Message::Input(protocol::InputMessage::ModifiersChanged {
                        shift,
                        ..
                    }) => {
                        trace!("QueueManager: modifiers changed. shift={}", shift);
                        self.shift_held = shift;
                    }
                    protocol::Message::Config(protocol::ConfigMessage::ConfigChanged(config)) => {
                        let sanitized = config::sanitize_config(config);
                        debug!(
                            "QueueManager: applying config. volume={}",
                            sanitized.playback.volume
                        );
                        self.volume = sanitized.playback.volume;
                        let _ = self.bus_producer.send(protocol::Message::Engine(
                            protocol::EngineMessage::SetVolume(self.volume),
                        ));
                    }
                    _ => trace!("QueueManager: ignoring unsupported message"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                    // Ignore lag as we've increased the bus capacity
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    error!("QueueManager: bus closed");
                    break;
                }
            }
        }
    }

    fn handle_queue_message(&mut self, message: protocol::QueueMessage) {
        match message {
            protocol::QueueMessage::InsertTracks {
                index,
                tracks,
                play_immediately,
            } => self.insert_tracks(index, tracks, play_immediately),
            protocol::QueueMessage::AppendTracks(tracks) => self.append_tracks(tracks),
            protocol::QueueMessage::ReplaceTracks {
                tracks,
                start_index,
                play_immediately,
            } => self.replace_tracks(tracks, start_index, play_immediately),
            protocol::QueueMessage::RemoveEntries(entry_ids) => self.remove_entry_ids(&entry_ids),
            protocol::QueueMessage::MoveEntry { from, to } => self.move_queue_entry(from, to),
            protocol::QueueMessage::Clear => {
                debug!("QueueManager: clearing queue");
                self.queue.clear();
                self.reset_playback();
                self.selection.resize_rows(0);
                self.broadcast_queue_changed();
                self.broadcast_selection_changed();
            }
            protocol::QueueMessage::DropTracks { tracks, position } => {
                self.drop_tracks(tracks, position)
            }
            protocol::QueueMessage::EnqueueGesture {
                tracks,
                event,
                fallback,
            } => self.enqueue_gesture(tracks, event, fallback),
            protocol::QueueMessage::SelectTrackMulti { index, ctrl, shift } => {
                self.selection.click(index, ctrl, shift);
                self.broadcast_selection_changed();
            }
            protocol::QueueMessage::DeselectAll => {
                self.selection.clear();
                self.broadcast_selection_changed();
            }
            protocol::QueueMessage::SelectAll => {
                self.selection.select_all();
                self.broadcast_selection_changed();
            }
            protocol::QueueMessage::MoveSelection { direction, shift } => {
                self.move_selection(direction, shift)
            }
            protocol::QueueMessage::DeleteSelected => self.delete_selected(),
            protocol::QueueMessage::DisplayListChanged { separator_flags } => {
                self.selection.set_display_rows(separator_flags);
                self.broadcast_selection_changed();
            }
            protocol::QueueMessage::ToggleRepeat => {
                self.repeat_mode = match self.repeat_mode {
                    protocol::RepeatMode::Off => protocol::RepeatMode::All,
                    protocol::RepeatMode::All => protocol::RepeatMode::Off,
                };
                debug!("QueueManager: repeat mode now {:?}", self.repeat_mode);
                let _ = self.bus_producer.send(protocol::Message::Queue(
                    protocol::QueueMessage::RepeatModeChanged(self.repeat_mode),
                ));
                self.broadcast_queue_changed();
            }
            // Our own notifications echoed back over the bus.
            _ => trace!("QueueManager: ignoring queue notification"),
        }
    }

    fn handle_playback_message(&mut self, message: protocol::PlaybackMessage) {
        match message {
            protocol::PlaybackMessage::Play => {
                debug!("QueueManager: received play command");
                if self.position.current_index().is_some() {
                    let _ = self
                        .bus_producer
                        .send(protocol::Message::Engine(protocol::EngineMessage::Play));
                } else if !self.queue.is_empty() {
                    self.play_entry_at(0, true);
                    self.broadcast_queue_changed();
                }
            }
            protocol::PlaybackMessage::Pause => {
                let _ = self
                    .bus_producer
                    .send(protocol::Message::Engine(protocol::EngineMessage::Pause));
            }
            protocol::PlaybackMessage::TogglePlayPause => {
                if self.is_playing {
                    let _ = self
                        .bus_producer
                        .send(protocol::Message::Engine(protocol::EngineMessage::Pause));
                } else if self.position.current_index().is_some() {
                    let _ = self
                        .bus_producer
                        .send(protocol::Message::Engine(protocol::EngineMessage::Play));
                } else if !self.queue.is_empty() {
                    self.play_entry_at(0, true);
                    self.broadcast_queue_changed();
                }
            }
            protocol::PlaybackMessage::Stop => {
                self.reset_playback();
                self.broadcast_queue_changed();
            }
            protocol::PlaybackMessage::Next => {
                let wrap = self.repeat_mode == protocol::RepeatMode::All;
                match self.position.step_next(self.queue.len(), wrap) {
                    Some(next) => {
                        self.play_entry_at(next, true);
                        self.broadcast_queue_changed();
                    }
                    None => debug!("QueueManager: next at end of queue, ignoring"),
                }
            }
            protocol::PlaybackMessage::Previous => {
                let wrap = self.repeat_mode == protocol::RepeatMode::All;
                match self.position.step_previous(self.queue.len(), wrap) {
                    Some(previous) => {
                        self.play_entry_at(previous, true);
                        self.broadcast_queue_changed();
                    }
                    None => debug!("QueueManager: previous at start of queue, ignoring"),
                }
            }
            protocol::PlaybackMessage::PlayTrackAtIndex(index) => {
                if index < self.queue.len() {
                    self.play_entry_at(index, true);
                    self.broadcast_queue_changed();
                } else {
                    debug!("QueueManager: play index {} out of bounds", index);
                }
            }
            protocol::PlaybackMessage::Seek(position_secs) => {
                let _ = self.bus_producer.send(protocol::Message::Engine(
                    protocol::EngineMessage::Seek(position_secs),
                ));
            }
            protocol::PlaybackMessage::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
                let _ = self.bus_producer.send(protocol::Message::Engine(
                    protocol::EngineMessage::SetVolume(self.volume),
                ));
            }
            protocol::PlaybackMessage::LoadSucceeded { entry_id, .. } => {
                if self.position.current_entry_id() != Some(entry_id.as_str()) {
                    debug!(
                        "QueueManager: discarding stale load result for {}",
                        entry_id
                    );
                    return;
                }
                self.error = None;
                self.broadcast_queue_changed();
            }
            protocol::PlaybackMessage::LoadFailed { entry_id, error } => {
                if self.position.current_entry_id() != Some(entry_id.as_str()) {
                    debug!(
                        "QueueManager: discarding stale load failure for {}",
                        entry_id
                    );
                    return;
                }
                error!("QueueManager: failed to load current track: {}", error);
                self.error = Some(error);
                self.is_playing = false;
                self.broadcast_queue_changed();
            }
            protocol::PlaybackMessage::StateChanged { is_playing } => {
                self.is_playing = is_playing;
                self.broadcast_queue_changed();
            }
            protocol::PlaybackMessage::Progress { .. } => {
                // Rendered directly by progress observers.
            }
            protocol::PlaybackMessage::Completed => {
                let wrap = self.repeat_mode == protocol::RepeatMode::All;
                match self.position.step_next(self.queue.len(), wrap) {
                    Some(next) => self.play_entry_at(next, true),
                    None => {
                        debug!("QueueManager: playback completed at end of queue");
                        self.is_playing = false;
                    }
                }
                self.broadcast_queue_changed();
            }
        }
    }

    fn insert_tracks(&mut self, index: usize, tracks: Vec<LocalTrack>, play_immediately: bool) {
        if tracks.is_empty() {
            return;
        }
        let count = tracks.len();
        let at = self.queue.insert_at(index, tracks);
        debug!("QueueManager: inserted {} tracks at {}", count, at);
        self.position.note_insert(at, count);
        self.selection.resize_rows(self.queue.len());
        if play_immediately {
            self.play_entry_at(at, true);
        }
        self.broadcast_queue_changed();
    }

    fn append_tracks(&mut self, tracks: Vec<LocalTrack>) {
        if tracks.is_empty() {
            return;
        }
        let was_empty = self.queue.is_empty();
        let count = tracks.len();
        let at = self.queue.append(tracks);
        debug!("QueueManager: appended {} tracks at {}", count, at);
        self.selection.resize_rows(self.queue.len());
        if was_empty {
            // Appending into an idle, empty queue starts playback.
            self.play_entry_at(0, true);
        }
        self.broadcast_queue_changed();
    }

    fn replace_tracks(
        &mut self,
        tracks: Vec<LocalTrack>,
        start_index: Option<usize>,
        play_immediately: bool,
    ) {
        debug!("QueueManager: replacing queue with {} tracks", tracks.len());
        self.queue.replace(tracks);
        self.selection.resize_rows(self.queue.len());
        if self.queue.is_empty() {
            self.reset_playback();
        } else {
            self.play_entry_at(start_index.unwrap_or(0), play_immediately);
        }
        self.broadcast_queue_changed();
    }

    fn remove_entry_ids(&mut self, entry_ids: &[String]) {
        let removed = self.queue.remove_entries(entry_ids);
        if removed.is_empty() {
            debug!("QueueManager: no matching entries to remove");
            return;
        }
        debug!("QueueManager: removed {} entries", removed.len());

        match self.position.note_remove(&removed, self.queue.len()) {
            RemovalImpact::CurrentRemoved {
                landing: Some(landing),
            } => {
                // The entry that slid into the removed slot takes over;
                // playback continues only if it was running.
                let autoplay = self.is_playing;
                self.play_entry_at(landing, autoplay);
            }
            RemovalImpact::CurrentRemoved { landing: None } => self.reset_playback(),
            RemovalImpact::Shifted | RemovalImpact::Unaffected => {}
        }

        self.selection.resize_rows(self.queue.len());
        self.broadcast_queue_changed();
        self.broadcast_selection_changed();
    }

    fn move_queue_entry(&mut self, from: usize, to: usize) {
        if !self.queue.move_entry(from, to) {
            return;
        }
        self.position.repair_after_move(&self.queue);
        self.selection.sync_after_reorder(from, to);
        self.broadcast_queue_changed();
        self.broadcast_selection_changed();
    }

    fn drop_tracks(&mut self, tracks: Vec<LocalTrack>, position: usize) {
        let outcome = filter_tracks_for_insert(self.queue.entries(), tracks);
        if outcome.skipped > 0 {
            let _ = self.bus_producer.send(protocol::Message::Queue(
                protocol::QueueMessage::TracksSkipped {
                    inserted: outcome.filtered.len(),
                    skipped: outcome.skipped,
                },
            ));
        }
        if outcome.filtered.is_empty() {
            debug!("QueueManager: dropped batch was all duplicates");
            return;
        }

        let count = outcome.filtered.len();
        let at = self.queue.insert_at(position, outcome.filtered);
        debug!("QueueManager: dropped {} tracks at {}", count, at);
        self.position.note_insert(at, count);
        self.selection.resize_rows(self.queue.len());
        self.broadcast_queue_changed();
    }

    fn enqueue_gesture(
        &mut self,
        tracks: Vec<LocalTrack>,
        event: Option<GestureEvent>,
        fallback: Option<QueueAction>,
    ) {
        let action = resolve_queue_action(event.as_ref(), self.shift_held, fallback);
        let outcome = filter_tracks_for_insert(self.queue.entries(), tracks);
        if outcome.skipped > 0 {
            let _ = self.bus_producer.send(protocol::Message::Queue(
                protocol::QueueMessage::TracksSkipped {
                    inserted: outcome.filtered.len(),
                    skipped: outcome.skipped,
                },
            ));
        }
        if outcome.filtered.is_empty() {
            debug!("QueueManager: gesture batch was all duplicates");
            return;
        }

        let count = outcome.filtered.len();
        debug!(
            "QueueManager: gesture resolved to {:?} for {} tracks",
            action, count
        );
        match action {
            QueueAction::Enqueue => {
                let was_empty = self.queue.is_empty();
                self.queue.append(outcome.filtered);
                if was_empty {
                    self.play_entry_at(0, true);
                }
            }
            QueueAction::PlayNext => {
                let at = match self.position.current_index() {
                    Some(current) => (current + 1).min(self.queue.len()),
                    None => self.queue.len(),
                };
                let at = self.queue.insert_at(at, outcome.filtered);
                self.position.note_insert(at, count);
                if self.position.current_index().is_none() {
                    self.play_entry_at(at, true);
                }
            }
            QueueAction::PlayNow => {
                let at = self
                    .position
                    .current_index()
                    .unwrap_or(self.queue.len());
                let at = self.queue.insert_at(at, outcome.filtered);
                self.position.note_insert(at, count);
                self.play_entry_at(at, true);
            }
        }
        self.selection.resize_rows(self.queue.len());
        self.broadcast_queue_changed();
    }

    fn move_selection(&mut self, direction: SelectionDirection, shift: bool) {
        self.selection.move_focus(direction, shift);
        self.broadcast_selection_changed();
    }

    fn delete_selected(&mut self) {
        let indices = self.selection.take_for_delete();
        if indices.is_empty() {
            self.broadcast_selection_changed();
            return;
        }

        // Selected rows past the queue end belong to a projected view and
        // have no entry to remove.
        let entry_ids: Vec<String> = indices
            .iter()
            .filter_map(|index| self.queue.entry(*index))
            .map(|entry| entry.entry_id.clone())
            .collect();
        if entry_ids.is_empty() {
            self.broadcast_selection_changed();
            return;
        }
        self.remove_entry_ids(&entry_ids);
    }

    /// Points playback at `index` and asks the engine to load that entry's
    /// file. Does not broadcast; callers publish the snapshot once all
    /// repairs for the triggering message are done.
    fn play_entry_at(&mut self, index: usize, autoplay: bool) {
        let Some(target) = self.position.set_current(&self.queue, index) else {
            self.reset_playback();
            return;
        };

        if let Some(entry) = self.queue.entry(target) {
            self.error = None;
            let _ = self.bus_producer.send(protocol::Message::Engine(
                protocol::EngineMessage::LoadTrack {
                    entry_id: entry.entry_id.clone(),
                    path: entry.track.file_path.clone(),
                    autoplay,
                },
            ));
        }
    }

    fn reset_playback(&mut self) {
        self.position.clear();
        self.is_playing = false;
        let _ = self
            .bus_producer
            .send(protocol::Message::Engine(protocol::EngineMessage::Stop));
    }

    fn broadcast_queue_changed(&self) {
        let snapshot = protocol::QueueSnapshot {
            entries: self.queue.entries().to_vec(),
            current_index: self.position.current_index(),
            current_track: self.position.current_track().cloned(),
            is_playing: self.is_playing,
            repeat_mode: self.repeat_mode,
            error: self.error.clone(),
        };
        let _ = self.bus_producer.send(protocol::Message::Queue(
            protocol::QueueMessage::QueueChanged(snapshot),
        ));
    }

    fn broadcast_selection_changed(&self) {
        let _ = self.bus_producer.send(protocol::Message::Queue(
            protocol::QueueMessage::SelectionChanged(self.selection.selected_indices()),
        ));
    }
}
