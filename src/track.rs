//! Track record and queue-slot identity types.

use std::path::PathBuf;

use uuid::Uuid;

/// One track as supplied by the library scanner. Immutable from the queue's
/// perspective; everything except `id` and `file_path` is display metadata.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LocalTrack {
    /// Stable track id, typically derived from the file path. May be empty
    /// for transient tracks that have not been indexed yet.
    pub id: String,
    /// Absolute path on disk. Primary de-duplication key for queue inserts.
    pub file_path: PathBuf,
    /// File name without directory.
    pub file_name: String,
    /// Track title.
    pub title: String,
    /// Track artist.
    pub artist: String,
    /// Album title, when known.
    pub album: Option<String>,
    /// Pre-formatted duration string as discovered from tags.
    pub duration: String,
    /// Cached artwork path, when extracted.
    pub thumbnail: Option<PathBuf>,
}

/// One slot in the play queue.
///
/// The `entry_id` identifies the slot, not the track: the same track queued
/// twice occupies two entries with distinct ids, which is what drag-reorder
/// and removal operate on. Ids are generated at insertion time and never
/// reused.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    /// Unique slot id within the queue.
    pub entry_id: String,
    /// The queued track.
    pub track: LocalTrack,
}

impl QueueEntry {
    /// Wraps a track in a fresh queue slot.
    pub fn new(track: LocalTrack) -> Self {
        Self {
            entry_id: Uuid::new_v4().to_string(),
            track,
        }
    }
}
