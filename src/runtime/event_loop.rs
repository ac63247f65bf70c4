use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, digit_seek_fraction};
use crate::audio::{AudioBackend, PlaybackController, PlayerPhase, SkipDirection};
use crate::config;
use crate::metadata::TrackDisplay;
use crate::mpris::{ControlCmd, MprisHandle, Status};
use crate::runtime::mpris_sync::update_mpris;
use crate::runtime::startup::open_locator;
use crate::schedule::TimerQueue;
use crate::ui::{self, PlayerView};
use crate::wave::WaveRenderer;

/// Upper bound on how long we block waiting for input.
const MAX_POLL: Duration = Duration::from_millis(50);

/// What was last published over MPRIS: status, metadata generation, whether
/// metadata had arrived, and the known duration.
type MprisKey = (Status, u64, bool, Duration);

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    last_mpris: Option<MprisKey>,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything the loop drives, borrowed for the duration of `run`.
pub struct Components<'a, B: AudioBackend> {
    pub app: &'a mut App,
    pub player: &'a mut PlaybackController<B>,
    pub wave: Option<&'a mut WaveRenderer>,
    pub timers: &'a mut TimerQueue,
}

/// Main terminal event loop: handles input, timers, UI drawing and MPRIS.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    c: &mut Components<'_, B>,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        c.player.poll(c.timers);
        dispatch_timers(c);

        // Keep MPRIS in sync even when playback changes come from media keys or the backend.
        let key: MprisKey = (
            Status::from(c.player.state().phase),
            c.player.metadata_loader().generation(),
            c.player.metadata().is_some(),
            c.player.state().duration,
        );
        if state.last_mpris != Some(key) {
            update_mpris(mpris, c.player);
            state.last_mpris = Some(key);
        }

        let track = TrackDisplay::new(c.player.metadata());
        let view = PlayerView {
            playback: c.player.state(),
            track: &track,
            source: c.player.source(),
        };
        let mut progress = Rect::default();
        let wave = c.wave.as_deref();
        terminal.draw(|f| progress = ui::draw(f, c.app, &view, wave, settings))?;
        c.app.set_progress_area(progress);

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, c) {
                return Ok(());
            }
        }

        let timeout = c.timers.timeout(Instant::now(), MAX_POLL);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, c, control_tx) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, c),
                Event::Resize(width, height) => {
                    if let Some(w) = c.wave.as_deref_mut() {
                        w.resize(usize::from(width), usize::from(height) * 2, c.timers);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Hand every due timer to whichever component owns it.
fn dispatch_timers<B: AudioBackend>(c: &mut Components<'_, B>) {
    for id in c.timers.take_due(Instant::now()) {
        if c.player.on_timer(id, c.timers) {
            continue;
        }
        if let Some(w) = c.wave.as_deref_mut() {
            if w.on_timer(id, c.timers) {
                continue;
            }
        }
        tracing::debug!(?id, "timer fired with no owner");
    }
}

fn handle_control_cmd<B: AudioBackend>(cmd: ControlCmd, c: &mut Components<'_, B>) -> bool {
    let playing = c.player.state().phase == PlayerPhase::Playing;
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if !playing {
                c.player.toggle_playback(c.timers);
            }
        }
        // There is no stopped state distinct from paused.
        ControlCmd::Pause | ControlCmd::Stop => {
            if playing {
                c.player.toggle_playback(c.timers);
            }
        }
        ControlCmd::PlayPause => c.player.toggle_playback(c.timers),
        ControlCmd::Next => c.player.skip(SkipDirection::Forward),
        ControlCmd::Prev => c.player.skip(SkipDirection::Backward),
    }
    false
}

fn handle_mouse_event<B: AudioBackend>(mouse: MouseEvent, c: &mut Components<'_, B>) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || c.app.open_mode {
        return;
    }
    if let Some(fraction) = c.app.seek_fraction_at(mouse.column, mouse.row) {
        c.player.seek_to_fraction(fraction);
    }
}

fn handle_key_event<B: AudioBackend>(
    key: KeyEvent,
    settings: &config::Settings,
    c: &mut Components<'_, B>,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    if c.app.open_mode {
        match key.code {
            KeyCode::Esc => c.app.cancel_open_mode(),
            KeyCode::Backspace => c.app.pop_open_char(),
            KeyCode::Enter => {
                if let Some(locator) = c.app.submit_open_input() {
                    open_locator(&locator, c.player, c.app, c.timers);
                }
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    c.app.push_open_char(ch);
                }
            }
            _ => {}
        }

        return false;
    }

    let step = i16::from(settings.controls.volume_step);
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => c.player.adjust_volume(step),
        KeyCode::Char('-') => c.player.adjust_volume(-step),
        KeyCode::Char('s') => c.player.toggle_shuffle(),
        KeyCode::Char('r') => c.player.toggle_repeat(),
        KeyCode::Char('o') => c.app.enter_open_mode(),
        KeyCode::Char('i') => c.app.toggle_track_info(),
        KeyCode::Char(ch) => {
            if let Some(fraction) = digit_seek_fraction(ch) {
                c.player.seek_to_fraction(fraction);
            }
        }
        _ => {}
    }

    false
}
