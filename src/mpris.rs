use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::audio::PlayerPhase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

/// The three states MPRIS knows about.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl From<PlayerPhase> for Status {
    fn from(phase: PlayerPhase) -> Self {
        match phase {
            PlayerPhase::Playing => Self::Playing,
            PlayerPhase::Ready | PlayerPhase::Paused => Self::Paused,
            PlayerPhase::Idle | PlayerPhase::Loading | PlayerPhase::Ended => Self::Stopped,
        }
    }
}

/// What desktop widgets get to see of the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    /// Load generation; becomes part of the track object path.
    pub id: u64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub url: Option<String>,
    pub length: Option<Duration>,
    /// `data:` URI of the embedded cover.
    pub art_url: Option<String>,
}

#[derive(Debug, Default)]
struct SharedState {
    status: Status,
    track: Option<TrackInfo>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_status(&self, status: Status) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
        }
    }

    pub fn set_track(&self, track: Option<TrackInfo>) {
        if let Ok(mut s) = self.state.lock() {
            s.track = track;
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "orpheus"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string(), "http".to_string(), "https".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned<'a, T: Into<Value<'a>>>(v: T) -> Option<OwnedValue> {
    OwnedValue::try_from(v.into()).ok()
}

fn metadata_map(track: &TrackInfo) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    let mut put = |key: &str, value: Option<OwnedValue>| {
        if let Some(v) = value {
            map.insert(key.to_string(), v);
        }
    };

    let track_id = format!("/org/mpris/MediaPlayer2/track/{}", track.id);
    put(
        "mpris:trackid",
        ObjectPath::try_from(track_id.as_str()).ok().and_then(owned),
    );
    put("xesam:title", track.title.clone().and_then(owned));
    put(
        "xesam:artist",
        track.artist.clone().and_then(|a| owned(vec![a])),
    );
    put("xesam:album", track.album.clone().and_then(owned));
    put("xesam:url", track.url.clone().and_then(owned));
    put(
        "mpris:length",
        track
            .length
            .and_then(|d| i64::try_from(d.as_micros()).ok())
            .and_then(owned),
    );
    put("mpris:artUrl", track.art_url.clone().and_then(owned));
    map
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.status {
            Status::Stopped => "Stopped",
            Status::Playing => "Playing",
            Status::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    // Next/Previous skip within the track.
    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.track.as_ref().map(metadata_map))
            .unwrap_or_default()
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.orpheus")
                .await
            {
                tracing::warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                tracing::warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                tracing::warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            tracing::debug!("MPRIS service registered");
            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
