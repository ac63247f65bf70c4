use std::time::Duration;

use crate::audio::{AudioBackend, PlaybackController};
use crate::mpris::{MprisHandle, Status, TrackInfo};

/// Snapshot of the bound source for desktop widgets.
pub fn track_info<B: AudioBackend>(player: &PlaybackController<B>) -> Option<TrackInfo> {
    let source = player.source()?;
    let meta = player.metadata();
    let duration = player.state().duration;

    Some(TrackInfo {
        id: player.metadata_loader().generation(),
        title: meta.and_then(|m| m.title.clone()),
        artist: meta.and_then(|m| m.artist.clone()),
        album: meta.and_then(|m| m.album.clone()),
        url: source.url(),
        length: (duration > Duration::ZERO).then_some(duration),
        art_url: meta.and_then(|m| m.cover.as_ref()).map(|c| c.data_uri()),
    })
}

pub fn update_mpris<B: AudioBackend>(mpris: &MprisHandle, player: &PlaybackController<B>) {
    mpris.set_track(track_info(player));
    mpris.set_status(Status::from(player.state().phase));
}
