use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ORPHEUS__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ORPHEUS")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.playback.initial_volume > 100 {
            return Err("playback.initial_volume must be <= 100".to_string());
        }
        if self.playback.skip_seconds == 0 {
            return Err("playback.skip_seconds must be >= 1".to_string());
        }
        if self.playback.sample_interval_ms == 0 {
            return Err("playback.sample_interval_ms must be >= 1".to_string());
        }
        if self.controls.volume_step == 0 || self.controls.volume_step > 100 {
            return Err("controls.volume_step must be between 1 and 100".to_string());
        }
        if self.wave.frame_interval_ms == 0 {
            return Err("wave.frame_interval_ms must be >= 1".to_string());
        }
        if !(self.wave.scale.is_finite() && self.wave.scale > 0.0) {
            return Err("wave.scale must be a positive number".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `ORPHEUS_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ORPHEUS_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/orpheus/config.toml`
/// or `~/.config/orpheus/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("orpheus").join("config.toml"))
}

/// `$XDG_STATE_HOME/orpheus/orpheus.log` or `~/.local/state/orpheus/orpheus.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("orpheus").join("orpheus.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(dir) = env::var_os(var) {
        Some(PathBuf::from(dir))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
