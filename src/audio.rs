//! Playback of a single bound audio source.
//!
//! `PlaybackController` owns the play/pause/seek state machine and talks to
//! the output through the `AudioBackend` trait. `RodioBackend` is the real
//! output; tests drive the controller with an in-memory backend.

mod backend;
mod controller;
mod sink;
mod types;

pub use backend::{AudioBackend, BackendEvent};
pub use controller::PlaybackController;
pub use sink::RodioBackend;
pub use types::*;
