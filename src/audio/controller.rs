use std::time::Duration;

use crate::config::PlaybackSettings;
use crate::metadata::{MetadataLoader, TrackMetadata};
use crate::schedule::{Scheduler, TaskId};
use crate::source::Source;

use super::backend::{AudioBackend, BackendEvent};
use super::types::{PlaybackError, PlaybackState, PlayerPhase, SkipDirection};

/// Mediates between user commands and the single bound audio resource.
///
/// While playing, a sampling timer re-reads the backend position every
/// `sample_interval`. Exactly one sampling handle is outstanding while in
/// `Playing` and none otherwise.
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    metadata: MetadataLoader,
    state: PlaybackState,
    source: Option<Source>,
    sampler: Option<TaskId>,
    sample_interval: Duration,
    skip_amount: Duration,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(mut backend: B, metadata: MetadataLoader, settings: &PlaybackSettings) -> Self {
        let state = PlaybackState {
            volume: settings.initial_volume.min(100),
            shuffle: settings.shuffle,
            repeat: settings.repeat,
            ..PlaybackState::default()
        };
        backend.set_volume(state.volume);

        Self {
            backend,
            metadata,
            state,
            source: None,
            sampler: None,
            sample_interval: Duration::from_millis(settings.sample_interval_ms.max(1)),
            skip_amount: Duration::from_secs(settings.skip_seconds),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn metadata(&self) -> Option<&TrackMetadata> {
        self.metadata.current()
    }

    pub fn metadata_loader(&self) -> &MetadataLoader {
        &self.metadata
    }

    pub fn skip_amount(&self) -> Duration {
        self.skip_amount
    }

    /// Handle of the outstanding sampling timer, if any.
    pub fn sampling_task(&self) -> Option<TaskId> {
        self.sampler
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Bind a new source and start reading its tags in the background.
    pub fn load_source(&mut self, source: Source, sched: &mut impl Scheduler) {
        self.stop_sampler(sched);
        self.backend.load(&source);

        self.state.phase = PlayerPhase::Loading;
        self.state.position = Duration::ZERO;
        self.state.duration = Duration::ZERO;
        self.state.is_playing = false;
        self.state.last_error = None;

        tracing::info!(source = %source, "loading source");
        self.metadata.request(&source);
        self.source = Some(source);
    }

    /// Play from `Ready`/`Paused`, pause from `Playing`, replay from the
    /// start in `Ended`. Ignored while idle or loading.
    pub fn toggle_playback(&mut self, sched: &mut impl Scheduler) {
        match self.state.phase {
            PlayerPhase::Idle | PlayerPhase::Loading => {
                tracing::debug!(phase = ?self.state.phase, "play/pause ignored");
            }
            PlayerPhase::Playing => {
                self.backend.pause();
                self.sample();
                self.stop_sampler(sched);
                self.state.phase = PlayerPhase::Paused;
                self.state.is_playing = false;
            }
            PlayerPhase::Ended => {
                if let Err(e) = self.backend.seek(Duration::ZERO) {
                    self.record_error(e);
                    return;
                }
                self.state.position = Duration::ZERO;
                self.start_playing(sched);
            }
            PlayerPhase::Ready | PlayerPhase::Paused => self.start_playing(sched),
        }
    }

    fn start_playing(&mut self, sched: &mut impl Scheduler) {
        match self.backend.play() {
            Ok(()) => {
                self.state.phase = PlayerPhase::Playing;
                self.state.is_playing = true;
                self.state.last_error = None;
                self.start_sampler(sched);
            }
            Err(e) => {
                self.record_error(e);
                self.state.phase = PlayerPhase::Paused;
                self.state.is_playing = false;
                self.stop_sampler(sched);
            }
        }
    }

    /// Jump to `fraction` of the track. No-op while the duration is unknown.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if self.state.duration.is_zero() || !fraction.is_finite() {
            return;
        }
        let target = self.state.duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.apply_seek(target);
    }

    /// Skip by the configured amount.
    pub fn skip(&mut self, direction: SkipDirection) {
        self.skip_by(direction, self.skip_amount);
    }

    pub fn skip_by(&mut self, direction: SkipDirection, amount: Duration) {
        if !self.state.phase.has_source() {
            return;
        }
        let target = match direction {
            SkipDirection::Forward => self.state.position.saturating_add(amount),
            SkipDirection::Backward => self.state.position.saturating_sub(amount),
        };
        self.apply_seek(target);
    }

    fn apply_seek(&mut self, target: Duration) {
        if !self.state.phase.has_source() {
            return;
        }
        // With an unknown length there is no upper bound to clamp to.
        let target = if self.state.duration.is_zero() {
            target
        } else {
            self.state.clamp_position(target)
        };
        if let Err(e) = self.backend.seek(target) {
            self.record_error(e);
            self.sample();
            return;
        }
        self.state.position = target;
        if self.state.phase == PlayerPhase::Ended {
            self.state.phase = PlayerPhase::Paused;
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.state.volume = volume.min(100);
        self.backend.set_volume(self.state.volume);
    }

    pub fn adjust_volume(&mut self, delta: i16) {
        let v = (i16::from(self.state.volume) + delta).clamp(0, 100);
        self.set_volume(v as u8);
    }

    pub fn toggle_shuffle(&mut self) {
        self.state.shuffle = !self.state.shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        self.state.repeat = !self.state.repeat;
    }

    /// Apply backend lifecycle events and finished metadata extractions.
    /// Returns true when anything visible changed.
    pub fn poll(&mut self, sched: &mut impl Scheduler) -> bool {
        let mut changed = false;
        while let Some(event) = self.backend.poll_event() {
            changed = true;
            self.handle_event(event, sched);
        }
        changed |= self.metadata.poll();
        changed
    }

    fn handle_event(&mut self, event: BackendEvent, sched: &mut impl Scheduler) {
        match event {
            BackendEvent::Ready { duration } => {
                if self.state.phase != PlayerPhase::Loading {
                    tracing::debug!(phase = ?self.state.phase, "ready event outside loading");
                    return;
                }
                self.state.duration = duration;
                self.state.position = Duration::ZERO;
                self.state.phase = PlayerPhase::Ready;
                self.backend.set_volume(self.state.volume);
                tracing::info!(duration = ?duration, "source ready");
            }
            BackendEvent::Ended => {
                if !matches!(self.state.phase, PlayerPhase::Playing | PlayerPhase::Paused) {
                    return;
                }
                self.stop_sampler(sched);
                self.state.position = self.state.duration;
                self.state.is_playing = false;
                self.state.phase = PlayerPhase::Ended;
                tracing::info!("track ended");
            }
            BackendEvent::Failed(e) => {
                self.stop_sampler(sched);
                self.record_error(e);
                self.state.phase = PlayerPhase::Idle;
                self.state.is_playing = false;
            }
        }
    }

    /// Timer dispatch. Returns false if `id` is not ours.
    pub fn on_timer(&mut self, id: TaskId, sched: &mut impl Scheduler) -> bool {
        if self.sampler != Some(id) {
            return false;
        }
        self.sampler = None;
        self.sample();
        if self.state.phase == PlayerPhase::Playing {
            self.start_sampler(sched);
        }
        true
    }

    /// Pause and drop the sampling timer. Called on teardown.
    pub fn shutdown(&mut self, sched: &mut impl Scheduler) {
        if self.state.phase == PlayerPhase::Playing {
            self.backend.pause();
            self.state.phase = PlayerPhase::Paused;
            self.state.is_playing = false;
        }
        self.stop_sampler(sched);
    }

    fn sample(&mut self) {
        let pos = self.backend.position();
        self.state.position = if self.state.duration.is_zero() {
            pos
        } else {
            self.state.clamp_position(pos)
        };
    }

    fn start_sampler(&mut self, sched: &mut impl Scheduler) {
        self.stop_sampler(sched);
        self.sampler = Some(sched.schedule(self.sample_interval));
    }

    fn stop_sampler(&mut self, sched: &mut impl Scheduler) {
        if let Some(id) = self.sampler.take() {
            sched.cancel(id);
        }
    }

    fn record_error(&mut self, e: PlaybackError) {
        tracing::warn!(error = %e, "playback error");
        self.state.last_error = Some(e);
    }
}
