use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Where log lines go: the configured file, else the XDG state default.
pub fn log_file_path(log: &LogSettings) -> Option<PathBuf> {
    log.file.clone().or_else(default_log_path)
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install a file-backed `tracing` subscriber.
///
/// The terminal belongs to the TUI, so nothing is ever written to stdout or
/// stderr. Without a usable log file, logging stays off.
pub fn init(log: &LogSettings) {
    let Some(path) = log_file_path(log) else {
        return;
    };
    let file = match open_log_file(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("orpheus: logging disabled, cannot open {}: {e}", path.display());
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    tracing::info!(path = %path.display(), "logging started");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_file_wins() {
        let log = LogSettings {
            file: Some(PathBuf::from("/tmp/custom.log")),
            ..LogSettings::default()
        };
        assert_eq!(log_file_path(&log), Some(PathBuf::from("/tmp/custom.log")));
    }

    #[test]
    fn open_log_file_creates_parents_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("orpheus").join("orpheus.log");

        {
            use std::io::Write;
            let mut f = open_log_file(&path).unwrap();
            writeln!(f, "first").unwrap();
            let mut f = open_log_file(&path).unwrap();
            writeln!(f, "second").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
