use std::time::Duration;

use super::model::TrackMetadata;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN: &str = "Unknown";

/// What to show in the artwork slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artwork {
    Embedded { mime_type: String, bytes: usize },
    Placeholder,
}

/// Text the player view renders for a track, with every missing field
/// replaced by its own fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDisplay {
    pub heading_title: String,
    pub heading_artist: String,
    pub heading_album: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    pub track: String,
    pub artwork: Artwork,
    /// Whether there is a snapshot at all (drives the info panel).
    pub has_metadata: bool,
}

impl TrackDisplay {
    pub fn new(meta: Option<&TrackMetadata>) -> Self {
        let title = meta.and_then(|m| m.title.as_deref());
        let artist = meta.and_then(|m| m.artist.as_deref());
        let album = meta.and_then(|m| m.album.as_deref());

        let genre = meta
            .filter(|m| !m.genres.is_empty())
            .map(|m| m.genres.join(", "))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let track_no = meta
            .and_then(|m| m.track_number)
            .map(|n| n.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let track_of = meta
            .and_then(|m| m.track_total)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());

        let artwork = match meta.and_then(|m| m.cover.as_ref()) {
            Some(c) if !c.data.is_empty() => Artwork::Embedded {
                mime_type: c.mime_type.clone(),
                bytes: c.data.len(),
            },
            _ => Artwork::Placeholder,
        };

        Self {
            heading_title: title.unwrap_or(UNKNOWN_TITLE).to_string(),
            heading_artist: artist.unwrap_or(UNKNOWN_ARTIST).to_string(),
            heading_album: album.unwrap_or(UNKNOWN_ALBUM).to_string(),
            title: title.unwrap_or(UNKNOWN).to_string(),
            artist: artist.unwrap_or(UNKNOWN).to_string(),
            album: album.unwrap_or(UNKNOWN).to_string(),
            year: meta
                .and_then(|m| m.year)
                .map(|y| y.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            genre,
            track: format!("{track_no} of {track_of}"),
            artwork,
            has_metadata: meta.is_some(),
        }
    }
}

/// Format seconds as `MM:SS`. Minutes are not capped at 99.
pub fn format_time(seconds: f64) -> String {
    let t = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let minutes = (t / 60.0).floor() as u64;
    let secs = (t % 60.0).floor() as u64;
    format!("{minutes:02}:{secs:02}")
}

pub fn format_duration(d: Duration) -> String {
    format_time(d.as_secs_f64())
}
