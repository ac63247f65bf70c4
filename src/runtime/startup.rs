use crate::app::App;
use crate::audio::{AudioBackend, PlaybackController};
use crate::schedule::Scheduler;
use crate::source::Source;

/// Parse `locator` and bind it to the player. Bad locators become a notice
/// instead of an error.
pub fn open_locator<B: AudioBackend>(
    locator: &str,
    player: &mut PlaybackController<B>,
    app: &mut App,
    sched: &mut impl Scheduler,
) {
    match Source::parse(locator) {
        Ok(source) => {
            app.clear_notice();
            player.load_source(source, sched);
        }
        Err(e) => {
            tracing::warn!(locator, error = %e, "cannot open locator");
            app.set_notice(format!("cannot open {locator}: {e}"));
        }
    }
}

/// Load the source given on the command line, if any.
pub fn open_initial_source<B: AudioBackend>(
    locator: Option<String>,
    player: &mut PlaybackController<B>,
    app: &mut App,
    sched: &mut impl Scheduler,
) {
    match locator {
        Some(locator) => open_locator(&locator, player, app, sched),
        None => tracing::info!("no source given, starting idle"),
    }
}
