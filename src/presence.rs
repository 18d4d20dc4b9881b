//! Presence aggregator client.
//!
//! The aggregator (Lanyard-style) mirrors a chat platform user's presence,
//! including the Spotify track they are listening to. It owns the Spotify
//! side entirely, so there is no token handling here.

use reqwest::{Client, StatusCode};

use crate::types::{PresenceResponse, TrackSnapshot};

/// Display limits applied when rendering presence tracks.
pub const TITLE_MAX_CHARS: usize = 40;
pub const ARTIST_MAX_CHARS: usize = 50;

#[derive(Debug)]
pub enum PresenceOutcome {
    Listening(TrackSnapshot),
    /// Not listening, or the feed lacks song or artist.
    Idle,
    Rejected(StatusCode),
}

/// Looks up `GET {base_url}/v1/users/{user_id}`.
pub async fn fetch_presence(
    client: &Client,
    base_url: &str,
    user_id: &str,
) -> Result<PresenceOutcome, reqwest::Error> {
    let url = format!("{base}/v1/users/{id}", base = base_url, id = user_id);
    let res = client.get(&url).send().await?;

    let status = res.status();
    if !status.is_success() {
        return Ok(PresenceOutcome::Rejected(status));
    }

    let body: PresenceResponse = res.json().await?;
    Ok(classify(body))
}

fn classify(body: PresenceResponse) -> PresenceOutcome {
    let Some(data) = body.data else {
        return PresenceOutcome::Idle;
    };
    if !data.listening_to_spotify {
        return PresenceOutcome::Idle;
    }
    let Some(spotify) = data.spotify else {
        return PresenceOutcome::Idle;
    };

    match (spotify.song, spotify.artist) {
        (Some(song), Some(artist)) if !song.is_empty() && !artist.is_empty() => {
            PresenceOutcome::Listening(TrackSnapshot {
                name: song,
                artists: vec![artist],
                album_art_url: spotify.album_art.filter(|url| !url.is_empty()),
                is_playing: true,
            })
        }
        _ => PresenceOutcome::Idle,
    }
}
