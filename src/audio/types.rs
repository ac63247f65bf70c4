//! Playback state types shared by the controller, the UI and MPRIS.

use std::time::Duration;

use thiserror::Error;

/// Where the controller is in the load/play lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerPhase {
    /// Nothing loaded.
    #[default]
    Idle,
    /// A source is bound but the backend has not reported it ready.
    Loading,
    /// Ready to play; duration is known.
    Ready,
    Playing,
    Paused,
    /// The track played to its end. Position is pinned at the duration.
    Ended,
}

impl PlayerPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Ready => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
        }
    }

    /// Whether play/pause/seek commands have something to act on.
    pub fn has_source(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused | Self::Ended)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipDirection {
    Forward,
    Backward,
}

/// Non-fatal playback failures. The controller records the latest one and
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("no audio output device: {0}")]
    Device(String),
    #[error("could not fetch audio: {0}")]
    Fetch(String),
    #[error("could not decode audio: {0}")]
    Decode(String),
    #[error("source is not ready")]
    NotReady,
    #[error("seek failed: {0}")]
    Seek(String),
}

/// Snapshot of the controller, read by the UI every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub phase: PlayerPhase,
    /// Current offset, never beyond `duration` once that is known.
    pub position: Duration,
    /// Total length; zero until the backend reports it.
    pub duration: Duration,
    pub is_playing: bool,
    /// 0..=100
    pub volume: u8,
    /// Display-only; there is no queue to shuffle.
    pub shuffle: bool,
    /// Display-only; there is no queue to repeat.
    pub repeat: bool,
    pub last_error: Option<PlaybackError>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            phase: PlayerPhase::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            is_playing: false,
            volume: 80,
            shuffle: false,
            repeat: false,
            last_error: None,
        }
    }
}

impl PlaybackState {
    /// Played fraction in `[0, 1]`; zero while the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub(super) fn clamp_position(&self, position: Duration) -> Duration {
        position.min(self.duration)
    }
}
