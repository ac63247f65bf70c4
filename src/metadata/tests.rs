use super::extract::leading_year;
use super::*;
use crate::source::{FetchError, Source};

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, Tag, TagType};

const WAIT: Duration = Duration::from_secs(5);

/// Minimal mono 16-bit PCM WAV with `samples` frames of silence.
fn wav_bytes(samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut v = Vec::new();
    v.extend_from_slice(b"RIFF");
    v.extend_from_slice(&(36 + data_len).to_le_bytes());
    v.extend_from_slice(b"WAVE");
    v.extend_from_slice(b"fmt ");
    v.extend_from_slice(&16u32.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes());
    v.extend_from_slice(&8000u32.to_le_bytes());
    v.extend_from_slice(&16000u32.to_le_bytes());
    v.extend_from_slice(&2u16.to_le_bytes());
    v.extend_from_slice(&16u16.to_le_bytes());
    v.extend_from_slice(b"data");
    v.extend_from_slice(&data_len.to_le_bytes());
    v.resize(v.len() + data_len as usize, 0);
    v
}

fn tagged_wav(dir: &std::path::Path, pictures: Vec<Picture>) -> std::path::PathBuf {
    let path = dir.join("tagged.wav");
    std::fs::write(&path, wav_bytes(8000)).unwrap();

    let mut tagged = lofty::read_from_path(&path).unwrap();
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title("Midnight Run".to_string());
    tag.set_artist("Neon Tide".to_string());
    tag.set_album("Afterglow".to_string());
    tag.set_genre("Synthwave".to_string());
    tag.set_year(1997);
    tag.set_track(3);
    tag.set_track_total(12);
    for p in pictures {
        tag.push_picture(p);
    }
    tagged.insert_tag(tag);
    tagged.save_to_path(&path, WriteOptions::default()).unwrap();
    path
}

fn meta(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: Some(title.to_string()),
        ..TrackMetadata::default()
    }
}

#[test]
fn extract_reads_tag_fields_and_first_picture() {
    let dir = tempfile::tempdir().unwrap();
    let front = Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Png),
        Some("front".to_string()),
        vec![0x89, b'P', b'N', b'G', 1, 2, 3],
    );
    let back = Picture::new_unchecked(
        PictureType::CoverBack,
        Some(MimeType::Jpeg),
        Some("back".to_string()),
        vec![0xFF, 0xD8, 0xFF, 9],
    );
    let path = tagged_wav(dir.path(), vec![front, back]);

    let m = extract(&Source::from_path(&path)).unwrap();
    assert_eq!(m.title.as_deref(), Some("Midnight Run"));
    assert_eq!(m.artist.as_deref(), Some("Neon Tide"));
    assert_eq!(m.album.as_deref(), Some("Afterglow"));
    assert_eq!(m.genres, vec!["Synthwave".to_string()]);
    assert_eq!(m.year, Some(1997));
    assert_eq!(m.track_number, Some(3));
    assert_eq!(m.track_total, Some(12));

    let cover = m.cover.expect("cover art");
    assert_eq!(cover.mime_type, "image/png");
    assert_eq!(cover.data, vec![0x89, b'P', b'N', b'G', 1, 2, 3]);
}

#[test]
fn extract_without_pictures_has_no_cover() {
    let dir = tempfile::tempdir().unwrap();
    let path = tagged_wav(dir.path(), Vec::new());

    let m = extract(&Source::from_path(&path)).unwrap();
    assert_eq!(m.title.as_deref(), Some("Midnight Run"));
    assert!(m.cover.is_none());
    assert_eq!(TrackDisplay::new(Some(&m)).artwork, Artwork::Placeholder);
}

#[test]
fn untagged_file_yields_empty_metadata() {
    let m = extract_from_bytes(wav_bytes(100)).unwrap();
    assert_eq!(m, TrackMetadata::default());
}

#[test]
fn garbage_bytes_are_a_metadata_error() {
    let err = extract_from_bytes(b"definitely not audio".to_vec()).unwrap_err();
    assert!(matches!(
        err,
        MetadataError::Parse(_) | MetadataError::Probe(_)
    ));
}

#[test]
fn missing_file_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract(&Source::from_path(dir.path().join("gone.mp3"))).unwrap_err();
    assert!(matches!(err, MetadataError::Fetch(FetchError::Io { .. })));
}

#[test]
fn leading_year_accepts_dates_and_rejects_noise() {
    assert_eq!(leading_year("1997"), Some(1997));
    assert_eq!(leading_year(" 2003-05-12 "), Some(2003));
    assert_eq!(leading_year("1988/02"), Some(1988));
    assert_eq!(leading_year("97"), None);
    assert_eq!(leading_year("19975"), None);
    assert_eq!(leading_year("unknown"), None);
    assert_eq!(leading_year("0000"), None);
}

#[test]
fn data_uri_matches_reference_encoding() {
    let cover = CoverImage {
        mime_type: "image/png".to_string(),
        data: b"Man".to_vec(),
    };
    assert_eq!(cover.data_uri(), "data:image/png;base64,TWFu");

    let cover = CoverImage {
        mime_type: "image/jpeg".to_string(),
        data: b"Ma".to_vec(),
    };
    assert_eq!(cover.data_uri(), "data:image/jpeg;base64,TWE=");

    let empty = CoverImage {
        mime_type: "image/jpeg".to_string(),
        data: Vec::new(),
    };
    assert_eq!(empty.data_uri(), "data:image/jpeg;base64,");
}

#[test]
fn data_uri_of_large_cover_equals_single_shot_encoding() {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    // Several chunks plus an odd tail so padding lands only at the very end.
    let data: Vec<u8> = (0..200_003u32).map(|i| (i % 251) as u8).collect();
    let cover = CoverImage {
        mime_type: "image/png".to_string(),
        data: data.clone(),
    };

    let uri = cover.data_uri();
    let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
    assert_eq!(payload, STANDARD.encode(&data));
    assert!(!payload.trim_end_matches('=').contains('='));
}

#[test]
fn display_falls_back_per_field() {
    let none = TrackDisplay::new(None);
    assert_eq!(none.heading_title, "Unknown Title");
    assert_eq!(none.heading_artist, "Unknown Artist");
    assert_eq!(none.heading_album, "Unknown Album");
    assert_eq!(none.year, "Unknown");
    assert_eq!(none.genre, "Unknown");
    assert_eq!(none.track, "Unknown of ?");
    assert_eq!(none.artwork, Artwork::Placeholder);
    assert!(!none.has_metadata);

    let partial = TrackMetadata {
        artist: Some("Neon Tide".to_string()),
        genres: vec!["Synthwave".to_string(), "Retro".to_string()],
        track_number: Some(4),
        cover: Some(CoverImage {
            mime_type: "image/jpeg".to_string(),
            data: vec![1, 2, 3],
        }),
        ..TrackMetadata::default()
    };
    let d = TrackDisplay::new(Some(&partial));
    assert_eq!(d.heading_title, "Unknown Title");
    assert_eq!(d.heading_artist, "Neon Tide");
    assert_eq!(d.title, "Unknown");
    assert_eq!(d.artist, "Neon Tide");
    assert_eq!(d.album, "Unknown");
    assert_eq!(d.genre, "Synthwave, Retro");
    assert_eq!(d.track, "4 of ?");
    assert_eq!(
        d.artwork,
        Artwork::Embedded {
            mime_type: "image/jpeg".to_string(),
            bytes: 3
        }
    );
    assert!(d.has_metadata);
}

#[test]
fn format_time_pads_minutes_and_seconds() {
    assert_eq!(format_time(65.0), "01:05");
    assert_eq!(format_time(3.0), "00:03");
    assert_eq!(format_time(0.0), "00:00");
    assert_eq!(format_time(59.999), "00:59");
    assert_eq!(format_time(6000.0), "100:00");
    assert_eq!(format_time(-4.0), "00:00");
    assert_eq!(format_time(f64::NAN), "00:00");
    assert_eq!(format_duration(Duration::from_millis(125_900)), "02:05");
}

/// Extractor whose results are held back until the test releases them.
fn gated_extractor(gates: HashMap<String, Receiver<()>>) -> Arc<ExtractFn> {
    let gates = Mutex::new(gates);
    Arc::new(move |source: &Source| -> Result<TrackMetadata, MetadataError> {
        let key = source.to_string();
        let gate = gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        Ok(meta(&key))
    })
}

#[test]
fn superseded_extraction_never_overwrites_newer_source() {
    let (release_a, gate_a) = mpsc::channel::<()>();
    let mut gates = HashMap::new();
    gates.insert("a.mp3".to_string(), gate_a);

    let mut loader = MetadataLoader::with_extractor(gated_extractor(gates));
    let gen_a = loader.request(&Source::from_path("a.mp3"));
    let gen_b = loader.request(&Source::from_path("b.mp3"));
    assert!(gen_b > gen_a);
    assert!(loader.current().is_none());

    // B finishes first and is committed.
    assert_eq!(loader.recv_timeout(WAIT), Some(Outcome::Committed));
    assert_eq!(loader.current().unwrap().title.as_deref(), Some("b.mp3"));

    // A arrives late and must be dropped.
    release_a.send(()).unwrap();
    assert_eq!(loader.recv_timeout(WAIT), Some(Outcome::Stale));
    assert_eq!(loader.current().unwrap().title.as_deref(), Some("b.mp3"));
}

#[test]
fn late_result_for_old_source_is_dropped_while_new_one_is_pending() {
    let (release_a, gate_a) = mpsc::channel::<()>();
    let (release_b, gate_b) = mpsc::channel::<()>();
    let mut gates = HashMap::new();
    gates.insert("a.mp3".to_string(), gate_a);
    gates.insert("b.mp3".to_string(), gate_b);

    let mut loader = MetadataLoader::with_extractor(gated_extractor(gates));
    loader.request(&Source::from_path("a.mp3"));
    loader.request(&Source::from_path("b.mp3"));

    release_a.send(()).unwrap();
    assert_eq!(loader.recv_timeout(WAIT), Some(Outcome::Stale));
    assert!(loader.current().is_none());

    release_b.send(()).unwrap();
    assert_eq!(loader.recv_timeout(WAIT), Some(Outcome::Committed));
    assert_eq!(loader.current().unwrap().title.as_deref(), Some("b.mp3"));
}

#[test]
fn failed_extraction_leaves_metadata_absent() {
    let mut loader = MetadataLoader::with_extractor(Arc::new(
        |_: &Source| -> Result<TrackMetadata, MetadataError> {
            Err(MetadataError::Fetch(FetchError::UnsupportedScheme(
                "ipfs".to_string(),
            )))
        },
    ));

    loader.request(&Source::from_path("x.mp3"));
    assert_eq!(loader.recv_timeout(WAIT), Some(Outcome::Failed));
    assert!(loader.current().is_none());
    assert!(loader.last_error().unwrap().contains("ipfs"));
}

#[test]
fn new_request_clears_previous_snapshot() {
    let mut loader = MetadataLoader::with_extractor(Arc::new(
        |s: &Source| -> Result<TrackMetadata, MetadataError> { Ok(meta(&s.to_string())) },
    ));
    loader.request(&Source::from_path("one.mp3"));
    assert_eq!(loader.recv_timeout(WAIT), Some(Outcome::Committed));
    assert!(loader.snapshot().is_some());

    loader.request(&Source::from_path("two.mp3"));
    assert!(loader.current().is_none());
    assert_eq!(loader.generation(), 2);
}

/// Drive `poll` the way the event loop does until `done` holds.
fn poll_until(loader: &mut MetadataLoader, done: impl Fn(&MetadataLoader) -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        loader.poll();
        if done(loader) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn poll_commits_newest_result_and_ignores_late_stale_one() {
    let (release_a, gate_a) = mpsc::channel::<()>();
    let (release_b, gate_b) = mpsc::channel::<()>();
    let mut gates = HashMap::new();
    gates.insert("a.mp3".to_string(), gate_a);
    gates.insert("b.mp3".to_string(), gate_b);

    let mut loader = MetadataLoader::with_extractor(gated_extractor(gates));
    loader.request(&Source::from_path("a.mp3"));
    loader.request(&Source::from_path("b.mp3"));
    assert!(!loader.poll());

    release_b.send(()).unwrap();
    assert!(poll_until(&mut loader, |l| l.current().is_some()));
    assert_eq!(loader.current().unwrap().title.as_deref(), Some("b.mp3"));

    // The superseded result lands later and never shows up.
    release_a.send(()).unwrap();
    let until = Instant::now() + Duration::from_millis(200);
    while Instant::now() < until {
        assert!(!loader.poll());
        assert_eq!(loader.current().unwrap().title.as_deref(), Some("b.mp3"));
        thread::sleep(Duration::from_millis(5));
    }
}
