use std::io::Cursor;

use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use thiserror::Error;

use crate::source::{FetchError, Source};

use super::model::{CoverImage, TrackMetadata};

const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not identify audio format: {0}")]
    Probe(#[source] std::io::Error),
    #[error("could not parse tags: {0}")]
    Parse(#[from] lofty::error::LoftyError),
}

/// Fetch `source` and parse its embedded tags.
pub fn extract(source: &Source) -> Result<TrackMetadata, MetadataError> {
    let bytes = source.fetch()?;
    extract_from_bytes(bytes)
}

/// Parse embedded tags from an in-memory audio file.
///
/// A file without any tag is not an error; it yields empty metadata.
pub fn extract_from_bytes(bytes: Vec<u8>) -> Result<TrackMetadata, MetadataError> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .map_err(MetadataError::Probe)?
        .read()?;

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return Ok(TrackMetadata::default());
    };

    Ok(from_tag(tag))
}

fn from_tag(tag: &Tag) -> TrackMetadata {
    TrackMetadata {
        title: non_empty(tag.title().as_deref()),
        artist: non_empty(tag.artist().as_deref()),
        album: non_empty(tag.album().as_deref()),
        year: tag.year().or_else(|| year_from_dates(tag)),
        genres: collect_genres(tag),
        track_number: tag.track(),
        track_total: tag.track_total(),
        cover: tag.pictures().first().map(|pic| CoverImage {
            mime_type: pic
                .mime_type()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_MIME.to_string()),
            data: pic.data().to_vec(),
        }),
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn collect_genres(tag: &Tag) -> Vec<String> {
    tag.get_strings(&ItemKey::Genre)
        .flat_map(|v| v.split('\0'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn year_from_dates(tag: &Tag) -> Option<u32> {
    [
        ItemKey::Year,
        ItemKey::RecordingDate,
        ItemKey::OriginalReleaseDate,
    ]
    .iter()
    .find_map(|key| tag.get_string(key).and_then(leading_year))
}

/// Read the year out of strings like `1997`, `1997-05-12` or `1997/05`.
pub(super) fn leading_year(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    digits.parse().ok().filter(|&y| y > 0)
}
