//! Application model types.

use ratatui::layout::{Position, Rect};

use crate::config::UiSettings;

/// View state owned by the UI thread.
#[derive(Debug, Clone)]
pub struct App {
    /// Whether the track information panel is visible.
    pub show_track_info: bool,
    /// The "open source" prompt is accepting input.
    pub open_mode: bool,
    pub open_input: String,
    /// One-line message shown in the status box until the next action.
    pub notice: Option<String>,
    progress_area: Option<Rect>,
}

impl App {
    pub fn new(ui: &UiSettings) -> Self {
        Self {
            show_track_info: ui.show_track_info,
            open_mode: false,
            open_input: String::new(),
            notice: None,
            progress_area: None,
        }
    }

    pub fn toggle_track_info(&mut self) {
        self.show_track_info = !self.show_track_info;
    }

    /// Enter the open prompt with an empty input line.
    pub fn enter_open_mode(&mut self) {
        self.open_mode = true;
        self.open_input.clear();
        self.notice = None;
    }

    /// Leave the open prompt, discarding the input.
    pub fn cancel_open_mode(&mut self) {
        self.open_mode = false;
        self.open_input.clear();
    }

    pub fn push_open_char(&mut self, c: char) {
        self.open_input.push(c);
    }

    pub fn pop_open_char(&mut self) {
        self.open_input.pop();
    }

    /// Leave the prompt and hand back what was typed, if anything.
    pub fn submit_open_input(&mut self) -> Option<String> {
        self.open_mode = false;
        let input = std::mem::take(&mut self.open_input);
        let trimmed = input.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn set_notice(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Remember where the progress bar was drawn for mouse seeking.
    pub fn set_progress_area(&mut self, area: Rect) {
        self.progress_area = (area.width > 0 && area.height > 0).then_some(area);
    }

    /// Fraction of the track under a click at (`column`, `row`), or `None`
    /// when the click misses the progress bar.
    pub fn seek_fraction_at(&self, column: u16, row: u16) -> Option<f64> {
        let area = self.progress_area?;
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        Some(f64::from(column - area.x) / f64::from(area.width))
    }
}

/// `0`..=`9` map to the start of each tenth of the track.
pub fn digit_seek_fraction(c: char) -> Option<f64> {
    c.to_digit(10).map(|d| f64::from(d) / 10.0)
}
