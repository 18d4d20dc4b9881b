use reqwest::{Client, StatusCode};

use crate::{
    types::{CurrentlyPlayingResponse, TrackSnapshot},
    utils,
};

/// Classified answer of one currently-playing request.
#[derive(Debug)]
pub enum PlayerResponse {
    /// 2xx with a JSON body. The item may still be null.
    Playing(CurrentlyPlayingResponse),
    /// 204, nothing is playing.
    NoContent,
    /// 401, the bearer token was rejected.
    Unauthorized,
    /// Any other non-success status.
    Rejected(StatusCode),
}

/// Fetches the user's currently playing track.
///
/// Sends `GET {api_url}/me/player/currently-playing` with the bearer token and
/// sorts the answer into a [`PlayerResponse`]. Only transport and decoding
/// failures are returned as errors.
///
/// # Example
///
/// ```
/// match currently_playing(&client, "https://api.spotify.com/v1", &token).await? {
///     PlayerResponse::Playing(body) => println!("{:?}", snapshot(body)),
///     other => println!("nothing to show: {:?}", other),
/// }
/// ```
pub async fn currently_playing(
    client: &Client,
    api_url: &str,
    token: &str,
) -> Result<PlayerResponse, reqwest::Error> {
    let url = format!("{uri}/me/player/currently-playing", uri = api_url);
    let res = client.get(&url).bearer_auth(token).send().await?;

    let status = res.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(PlayerResponse::NoContent);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Ok(PlayerResponse::Unauthorized);
    }
    if !status.is_success() {
        return Ok(PlayerResponse::Rejected(status));
    }

    let body: CurrentlyPlayingResponse = res.json().await?;
    Ok(PlayerResponse::Playing(body))
}

/// Builds the snapshot for a response, `None` when no item is present.
pub fn snapshot(response: CurrentlyPlayingResponse) -> Option<TrackSnapshot> {
    let track = response.item?;
    let album_art_url = track
        .album
        .as_ref()
        .and_then(|album| utils::select_album_art(&album.images));

    Some(TrackSnapshot {
        name: track.name,
        artists: track.artists.into_iter().map(|a| a.name).collect(),
        album_art_url,
        is_playing: response.is_playing,
    })
}
