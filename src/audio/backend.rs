//! The seam between the controller and whatever actually makes sound.

use std::time::Duration;

use crate::source::Source;

use super::types::PlaybackError;

/// Lifecycle notifications from the bound audio resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// The source is decoded far enough to know its length.
    Ready { duration: Duration },
    /// Playback reached the natural end of the track.
    Ended,
    /// The source could not be loaded.
    Failed(PlaybackError),
}

/// One audio resource at a time. Loading may finish asynchronously and is
/// reported through `poll_event`.
pub trait AudioBackend {
    /// Bind `source`, releasing whatever was bound before.
    fn load(&mut self, source: &Source);
    /// Start or resume playback.
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Move the playhead.
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;
    /// Volume in percent, `0..=100`.
    fn set_volume(&mut self, percent: u8);
    /// Current playhead of the bound resource.
    fn position(&self) -> Duration;
    /// Next pending lifecycle event, if any.
    fn poll_event(&mut self) -> Option<BackendEvent>;
}
