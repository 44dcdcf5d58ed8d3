//! Queue and playback-ordering core for a desktop music player.
//!
//! This crate owns the play queue, the currently-playing position, and the
//! list-selection state, and maps user gestures onto deterministic queue
//! mutations. Rendering and the native audio engine are external components
//! that subscribe to the same broadcast bus: the renderer reacts to
//! `QueueChanged`/`SelectionChanged` notifications, the engine bridge reacts
//! to `EngineMessage` commands and reports back with playback events.

pub mod config;
pub mod drop_filter;
pub mod position;
pub mod protocol;
pub mod queue;
pub mod queue_actions;
pub mod queue_manager;
pub mod selection;
pub mod track;
