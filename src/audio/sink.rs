//! `rodio` output for the playback controller.
//!
//! Sources are fetched and decoded on a worker thread; the finished decoder
//! comes back over a channel tagged with the load generation so a slow fetch
//! can never replace a newer source.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use lofty::file::AudioFile;
use lofty::probe::Probe;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source as _};

use crate::source::Source;

use super::backend::{AudioBackend, BackendEvent};
use super::types::PlaybackError;

type Bytes = Arc<[u8]>;

struct Prepared {
    bytes: Bytes,
    duration: Duration,
}

struct Loaded {
    generation: u64,
    result: Result<Prepared, PlaybackError>,
}

pub struct RodioBackend {
    stream: OutputStream,
    sink: Option<Sink>,
    bytes: Option<Bytes>,
    generation: u64,
    tx: Sender<Loaded>,
    rx: Receiver<Loaded>,
    events: VecDeque<BackendEvent>,
    playing: bool,
    volume: f32,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open() -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);

        let (tx, rx) = mpsc::channel();
        Ok(Self {
            stream,
            sink: None,
            bytes: None,
            generation: 0,
            tx,
            rx,
            events: VecDeque::new(),
            playing: false,
            volume: 0.8,
        })
    }

    fn release(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.bytes = None;
        self.playing = false;
    }

    fn drain_loads(&mut self) {
        while let Ok(loaded) = self.rx.try_recv() {
            if loaded.generation != self.generation {
                tracing::debug!(generation = loaded.generation, "dropping stale audio load");
                continue;
            }
            match loaded.result {
                Ok(prepared) => match create_sink(&self.stream, &prepared.bytes, self.volume) {
                    Ok(sink) => {
                        self.sink = Some(sink);
                        self.bytes = Some(prepared.bytes);
                        self.events.push_back(BackendEvent::Ready {
                            duration: prepared.duration,
                        });
                    }
                    Err(e) => self.events.push_back(BackendEvent::Failed(e)),
                },
                Err(e) => self.events.push_back(BackendEvent::Failed(e)),
            }
        }
    }

    fn check_ended(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.playing && sink.empty() {
            self.playing = false;
            self.events.push_back(BackendEvent::Ended);
        }
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, source: &Source) {
        self.release();
        self.generation += 1;

        let generation = self.generation;
        let source = source.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = prepare(&source);
            // The backend may be gone by now; nothing to do then.
            let _ = tx.send(Loaded { generation, result });
        });
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let sink = self.sink.as_ref().ok_or(PlaybackError::NotReady)?;
        if sink.empty() {
            return Err(PlaybackError::NotReady);
        }
        sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let Some(bytes) = self.bytes.clone() else {
            return Err(PlaybackError::NotReady);
        };
        let (stream, volume) = (&self.stream, self.volume);
        let sink = refill_sink(&mut self.sink, self.playing, || {
            create_sink(stream, &bytes, volume)
        })?;
        sink.try_seek(position)
            .map_err(|e| PlaybackError::Seek(e.to_string()))
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume = f32::from(percent.min(100)) / 100.0;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(self.volume);
        }
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map(Sink::get_pos).unwrap_or_default()
    }

    fn poll_event(&mut self) -> Option<BackendEvent> {
        self.drain_loads();
        self.check_ended();
        self.events.pop_front()
    }
}

fn prepare(source: &Source) -> Result<Prepared, PlaybackError> {
    let bytes: Bytes = source
        .fetch()
        .map_err(|e| PlaybackError::Fetch(e.to_string()))?
        .into();

    let decoder = Decoder::new(Cursor::new(Arc::clone(&bytes)))
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let duration = decoder
        .total_duration()
        .or_else(|| probe_duration(&bytes))
        .unwrap_or_default();

    Ok(Prepared { bytes, duration })
}

/// Container-level duration for formats the decoder cannot size up front.
fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}

/// A sink that played to the end has dropped its source; rebuild it.
///
/// The drain may not have been reported as `Ended` yet, so a sink that was
/// playing keeps playing after the rebuild.
fn refill_sink(
    slot: &mut Option<Sink>,
    playing: bool,
    make: impl FnOnce() -> Result<Sink, PlaybackError>,
) -> Result<&Sink, PlaybackError> {
    if slot.as_ref().is_none_or(Sink::empty) {
        let sink = make()?;
        if playing {
            sink.play();
        }
        *slot = Some(sink);
    }
    slot.as_ref().ok_or(PlaybackError::NotReady)
}

/// A paused `Sink` holding a fresh decoder over `bytes`.
fn create_sink(stream: &OutputStream, bytes: &Bytes, volume: f32) -> Result<Sink, PlaybackError> {
    let decoder = Decoder::new(Cursor::new(Arc::clone(bytes)))
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(decoder);
    sink.pause();
    sink.set_volume(volume);
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::Source as _;
    use rodio::source::SineWave;

    /// A paused sink with one queued source, detached from any device.
    fn queued_sink() -> (Sink, rodio::queue::SourcesQueueOutput) {
        let (sink, queue) = Sink::new();
        sink.append(SineWave::new(440.0).take_duration(Duration::from_secs(1)));
        sink.pause();
        (sink, queue)
    }

    #[test]
    fn drained_sink_is_rebuilt_playing_when_it_was_playing() {
        let (drained, _drained_queue) = Sink::new();
        assert!(drained.empty());
        let mut slot = Some(drained);

        let mut _queue = None;
        let sink = refill_sink(&mut slot, true, || {
            let (s, q) = queued_sink();
            _queue = Some(q);
            Ok(s)
        })
        .unwrap();
        assert!(!sink.empty());
        assert!(!sink.is_paused());
    }

    #[test]
    fn drained_sink_is_rebuilt_paused_after_the_end_was_reported() {
        let mut slot = None;
        let mut _queue = None;
        let sink = refill_sink(&mut slot, false, || {
            let (s, q) = queued_sink();
            _queue = Some(q);
            Ok(s)
        })
        .unwrap();
        assert!(sink.is_paused());
    }

    #[test]
    fn live_sink_is_kept() {
        let (live, _queue) = queued_sink();
        let mut slot = Some(live);
        let sink = refill_sink(&mut slot, true, || Err(PlaybackError::NotReady)).unwrap();
        assert!(sink.is_paused());
    }
}
