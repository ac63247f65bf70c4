use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/orpheus/config.toml` or `~/.config/orpheus/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ORPHEUS__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub wave: WaveSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume applied before anything is loaded, in percent.
    pub initial_volume: u8,
    /// Seconds to jump when skipping forward or back.
    pub skip_seconds: u64,
    /// How often the playhead is re-read while playing (milliseconds).
    pub sample_interval_ms: u64,
    /// Whether the shuffle indicator starts enabled.
    pub shuffle: bool,
    /// Whether the repeat indicator starts enabled.
    pub repeat: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: 80,
            skip_seconds: 10,
            sample_interval_ms: 1000,
            shuffle: false,
            repeat: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Percent added or removed by `+` / `-`.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { volume_step: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    /// Draw the animated background at all.
    pub enabled: bool,
    /// Delay between animation frames (milliseconds).
    pub frame_interval_ms: u64,
    /// Logical pixels per terminal half-cell.
    ///
    /// The wave layers are tuned for a large canvas; a scale above 1 squeezes
    /// them so whole waves fit a terminal.
    pub scale: f64,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_interval_ms: 33,
            scale: 4.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the track information panel starts visible.
    pub show_track_info: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ORPHEUS ".to_string(),
            show_track_info: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `orpheus=debug`.
    /// `RUST_LOG` wins when set.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/orpheus/orpheus.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
