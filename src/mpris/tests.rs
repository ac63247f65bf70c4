use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn iface() -> (PlayerIface, Arc<Mutex<SharedState>>, mpsc::Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    (
        PlayerIface {
            tx,
            state: state.clone(),
        },
        state,
        rx,
    )
}

fn track() -> TrackInfo {
    TrackInfo {
        id: 7,
        title: Some("Test Title".to_string()),
        artist: Some("Test Artist".to_string()),
        album: Some("Test Album".to_string()),
        url: Some("file:///tmp/music/test.mp3".to_string()),
        length: Some(Duration::from_micros(1_234_567)),
        art_url: Some("data:image/png;base64,AAAA".to_string()),
    }
}

#[test]
fn phases_map_to_mpris_status() {
    assert_eq!(Status::from(PlayerPhase::Idle), Status::Stopped);
    assert_eq!(Status::from(PlayerPhase::Loading), Status::Stopped);
    assert_eq!(Status::from(PlayerPhase::Ready), Status::Paused);
    assert_eq!(Status::from(PlayerPhase::Playing), Status::Playing);
    assert_eq!(Status::from(PlayerPhase::Paused), Status::Paused);
    assert_eq!(Status::from(PlayerPhase::Ended), Status::Stopped);
}

#[test]
fn playback_status_reflects_handle_updates() {
    let (iface, state, _rx) = iface();
    let handle = MprisHandle {
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");
    handle.set_status(Status::Playing);
    assert_eq!(iface.playback_status(), "Playing");
    handle.set_status(Status::Paused);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (iface, state, _rx) = iface();
    MprisHandle {
        state: state.clone(),
    }
    .set_track(Some(track()));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:length",
        "mpris:artUrl",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
    assert_eq!(
        i64::try_from(map["mpris:length"].clone()).unwrap(),
        1_234_567
    );
}

#[test]
fn metadata_omits_missing_fields_and_clears() {
    let (iface, state, _rx) = iface();
    let handle = MprisHandle {
        state: state.clone(),
    };
    handle.set_track(Some(TrackInfo {
        id: 1,
        ..TrackInfo::default()
    }));

    let map = iface.metadata();
    assert!(map.contains_key("mpris:trackid"));
    assert!(!map.contains_key("xesam:title"));
    assert!(!map.contains_key("mpris:artUrl"));

    handle.set_track(None);
    assert!(iface.metadata().is_empty());
}

#[test]
fn player_methods_forward_commands() {
    let (iface, _state, rx) = iface();
    iface.play();
    iface.pause();
    iface.play_pause();
    iface.stop();
    iface.next();
    iface.previous();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::Play,
            ControlCmd::Pause,
            ControlCmd::PlayPause,
            ControlCmd::Stop,
            ControlCmd::Next,
            ControlCmd::Prev,
        ]
    );
}
