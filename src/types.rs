use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short-lived bearer credential for the Spotify Web API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
    pub obtained_at: DateTime<Utc>,
}

/// Seconds before the stated expiry at which a token is already replaced.
pub const EXPIRY_MARGIN_SECS: u64 = 60;

impl AccessToken {
    /// Whether the token should be refreshed before its next use.
    ///
    /// A token of unknown lifetime (`expires_in == 0`) never expires here;
    /// the API's 401 decides for it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.expires_in == 0 {
            return false;
        }
        let usable_for = self.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        let age = (now - self.obtained_at).num_seconds();
        age >= i64::try_from(usable_for).unwrap_or(i64::MAX)
    }

    /// Wraps a pre-obtained token whose lifetime is unknown.
    pub fn preconfigured(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: 0,
            obtained_at: Utc::now(),
        }
    }
}

/// Token grant returned by the authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Shared state between the token helper and its callback handler.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub state: String,
    pub outcome: Option<Result<Token, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,
    pub item: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<AlbumImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlbumImage {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// What is playing at a given poll tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackSnapshot {
    pub name: String,
    pub artists: Vec<String>,
    pub album_art_url: Option<String>,
    pub is_playing: bool,
}

impl TrackSnapshot {
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresenceResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<PresenceData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresenceData {
    #[serde(default)]
    pub listening_to_spotify: bool,
    pub spotify: Option<PresenceSpotify>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresenceSpotify {
    pub song: Option<String>,
    pub artist: Option<String>,
    #[serde(alias = "albumArt")]
    pub album_art: Option<String>,
}

/// JSON body of the refresh route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefreshResponse {
    Token { access_token: String, expires_in: u64 },
    Error { error: String },
}

/// JSON body of the now-playing status route.
#[derive(Debug, Clone, Serialize)]
pub struct NowPlayingStatus {
    pub state: &'static str,
    pub track: Option<TrackSnapshot>,
}
