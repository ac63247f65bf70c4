//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Padding, Paragraph, Widget, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::audio::{PlaybackState, PlayerPhase};
use crate::config::Settings;
use crate::metadata::{Artwork, TrackDisplay, format_duration};
use crate::source::Source;
use crate::wave::{WaveBackground, WaveRenderer};

const PANEL_BG: Color = Color::Rgb(16, 14, 40);
const ACCENT: Color = Color::Rgb(138, 43, 226);
const MUTED: Color = Color::Rgb(150, 140, 190);
const MAX_WIDTH: u16 = 84;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("space/p".to_string(), "play/pause".to_string());
    // h/l and +/- are filled dynamically from config.
    map.insert("0-9".to_string(), "jump to tenth".to_string());
    map.insert("click".to_string(), "seek".to_string());
    map.insert("o".to_string(), "open".to_string());
    map.insert("i".to_string(), "track info".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating skip seconds and volume step.
fn controls_text(skip_seconds: u64, volume_step: u8) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "space/p", "h/l", "0-9", "click", "+/-", "o", "i", "s", "r", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "h/l" => Some(format!("[h/l] skip -/+{skip_seconds}s")),
            "+/-" => Some(format!("[+/-] volume ±{volume_step}")),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}")),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Everything the player view reads from the controller for one frame.
pub struct PlayerView<'a> {
    pub playback: &'a PlaybackState,
    pub track: &'a TrackDisplay,
    pub source: Option<&'a Source>,
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(title)
        .style(Style::default().bg(PANEL_BG).fg(Color::White))
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
}

/// Panels are opaque; the backdrop only shows around them.
fn render_panel(frame: &mut Frame, widget: impl Widget, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn artwork_text(artwork: &Artwork) -> String {
    match artwork {
        Artwork::Embedded { mime_type, bytes } => {
            format!("cover: {mime_type}, {:.1} KiB", *bytes as f64 / 1024.0)
        }
        Artwork::Placeholder => "default artwork".to_string(),
    }
}

/// First line: player flags. Second line: the latest notice or error.
fn status_lines(app: &App, view: &PlayerView) -> Vec<Line<'static>> {
    let s = view.playback;
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!("STATE: {}", s.phase.label()));
    parts.push(format!("VOL: {}%", s.volume));
    parts.push(format!("Shuffle: {}", if s.shuffle { "ON" } else { "OFF" }));
    parts.push(format!("Repeat: {}", if s.repeat { "ON" } else { "OFF" }));

    if let Some(ext) = view.source.and_then(Source::extension) {
        parts.push(ext.to_ascii_uppercase());
    }

    let mut lines = vec![Line::from(parts.join(" • "))];
    if let Some(notice) = &app.notice {
        lines.push(Line::from(notice.clone()).fg(MUTED));
    } else if let Some(err) = &s.last_error {
        lines.push(Line::from(format!("Error: {err}")).fg(Color::LightRed));
    }
    lines
}

fn info_lines(track: &TrackDisplay) -> Vec<Line<'static>> {
    let row = |label: &'static str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label:<7}"), Style::default().fg(MUTED)),
            Span::raw(value.to_string()),
        ])
    };
    vec![
        row("Title", &track.title),
        row("Artist", &track.artist),
        row("Album", &track.album),
        row("Year", &track.year),
        row("Genre", &track.genre),
        row("Track", &track.track),
    ]
}

/// Render the entire UI into the provided `frame`.
///
/// Returns the area of the progress bar so mouse clicks can be mapped back
/// to a position in the track.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    view: &PlayerView,
    wave: Option<&WaveRenderer>,
    settings: &Settings,
) -> Rect {
    let full = frame.area();
    let backdrop = match wave {
        Some(r) => WaveBackground::new(r),
        None => WaveBackground::gradient(),
    };
    frame.render_widget(backdrop, full);

    let width = full.width.saturating_sub(4).min(MAX_WIDTH);
    let column = Rect {
        x: full.x + (full.width.saturating_sub(width) / 2),
        width,
        ..full
    };

    let show_info = app.show_track_info && view.track.has_metadata;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .spacing(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(if show_info { 8 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(column);

    // Header
    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .add_modifier(Modifier::BOLD)
        .block(
            panel(" orpheus ").title_alignment(Alignment::Center),
        );
    render_panel(frame, header, chunks[0]);

    // Now playing
    let track = view.track;
    let now_playing = if view.playback.phase == PlayerPhase::Idle && view.source.is_none() {
        vec![
            Line::from("Nothing loaded").add_modifier(Modifier::BOLD),
            Line::from("press o to open a file or URL").fg(MUTED),
        ]
    } else {
        vec![
            Line::from(track.heading_title.clone()).add_modifier(Modifier::BOLD),
            Line::from(format!("{} • {}", track.heading_artist, track.heading_album)),
            Line::from(artwork_text(&track.artwork)).fg(MUTED),
        ]
    };
    let now_playing = Paragraph::new(now_playing)
        .block(panel(" now playing "))
        .wrap(Wrap { trim: true });
    render_panel(frame, now_playing, chunks[1]);

    // Progress
    let s = view.playback;
    let progress_block = panel(" progress ");
    let progress_area = progress_block.inner(chunks[2]);
    let label = format!(
        "{} / {}",
        format_duration(s.position),
        format_duration(s.duration)
    );
    let gauge = Gauge::default()
        .block(progress_block)
        .gauge_style(Style::default().fg(ACCENT).bg(Color::Rgb(30, 26, 70)))
        .ratio(s.progress())
        .label(label);
    render_panel(frame, gauge, chunks[2]);

    // Track information
    if show_info {
        let info = Paragraph::new(info_lines(track)).block(panel(" track information "));
        render_panel(frame, info, chunks[3]);
    }

    // Status
    let status = Paragraph::new(status_lines(app, view)).block(panel(" status "));
    render_panel(frame, status, chunks[5]);

    // Controls
    let footer = Paragraph::new(controls_text(
        settings.playback.skip_seconds,
        settings.controls.volume_step,
    ))
    .block(panel(" controls "))
    .wrap(Wrap { trim: true });
    render_panel(frame, footer, chunks[6]);

    // Open prompt
    if app.open_mode {
        let popup_area = centered_rect_sized(64, 5, full);
        let prompt = Paragraph::new(vec![
            Line::from(format!("> {}_", app.open_input)),
            Line::from("enter opens • esc cancels").fg(MUTED),
        ])
        .block(panel(" open file or URL "));
        render_panel(frame, prompt, popup_area);
    }

    progress_area
}
