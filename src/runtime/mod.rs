use std::env;
use std::sync::mpsc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{PlaybackController, RodioBackend};
use crate::metadata::MetadataLoader;
use crate::mpris::ControlCmd;
use crate::schedule::TimerQueue;
use crate::wave::WaveRenderer;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log);

    let locator = env::args().nth(1);

    let backend = RodioBackend::open().map_err(|e| {
        tracing::error!(error = %e, "no audio output");
        e
    })?;
    let mut player = PlaybackController::new(backend, MetadataLoader::new(), &settings.playback);
    let mut timers = TimerQueue::new();
    let mut app = App::new(&settings.ui);

    startup::open_initial_source(locator, &mut player, &mut app, &mut timers);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    mpris_sync::update_mpris(&mpris, &player);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The backdrop surface has two pixel rows per terminal cell.
    let mut wave = settings.wave.enabled.then(|| WaveRenderer::new(&settings.wave));
    if let Some(w) = wave.as_mut() {
        let size = terminal.size()?;
        w.mount(usize::from(size.width), usize::from(size.height) * 2, &mut timers);
    }

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        let mut components = event_loop::Components {
            app: &mut app,
            player: &mut player,
            wave: wave.as_mut(),
            timers: &mut timers,
        };

        event_loop::run(
            &mut terminal,
            &settings,
            &mut components,
            &mpris,
            &control_tx,
            &control_rx,
            &mut state,
        )
    })();

    if let Some(w) = wave.as_mut() {
        w.unmount(&mut timers);
    }
    player.shutdown(&mut timers);
    tracing::info!("shutting down");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
