use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::{Config, Credentials, SourceKind},
    management::TokenManager,
    nowplaying::PollError,
    presence::{self, PresenceOutcome},
    spotify::{
        auth::{RefreshError, refresh_access_token},
        player::{self, PlayerResponse},
    },
    types::TrackSnapshot,
    warning,
};

/// Something that can tell what is playing right now.
///
/// `Ok(None)` means nothing is playing and is not an error.
#[async_trait]
pub trait NowPlayingSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch_current_track(&self) -> Result<Option<TrackSnapshot>, PollError>;
}

/// Builds the source selected by configuration.
///
/// Returns `None` for the presence source when no user identifier is
/// configured; the widget is not mounted at all in that case.
pub fn select_source(config: &Config, client: Client) -> Option<Arc<dyn NowPlayingSource>> {
    match config.source {
        SourceKind::Spotify => Some(Arc::new(SpotifySource::new(client, config))),
        SourceKind::Presence => match &config.presence_user_id {
            Some(user_id) => Some(Arc::new(PresenceSource::new(
                client,
                &config.endpoints.presence_url,
                user_id,
            ))),
            None => {
                warning!("PRESENCE_USER_ID is not set, now playing is disabled");
                None
            }
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

enum Step {
    Done(Option<TrackSnapshot>),
    Reauthorize,
}

/// Polls the Spotify Web API directly, refreshing the access token when it
/// is missing or rejected.
pub struct SpotifySource {
    client: Client,
    credentials: Credentials,
    api_url: String,
    token_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifySource {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            credentials: config.credentials.clone(),
            api_url: config.endpoints.api_url.clone(),
            token_url: config.endpoints.token_url.clone(),
            tokens: Mutex::new(TokenManager::from_configured(
                config.access_token.as_deref(),
            )),
        }
    }

    pub async fn current_token(&self) -> Option<String> {
        self.tokens.lock().await.bearer()
    }

    /// Mints a new access token and makes it the current one.
    async fn refresh(&self) -> Result<String, RefreshError> {
        let token = refresh_access_token(&self.client, &self.credentials, &self.token_url).await?;
        let mut tokens = self.tokens.lock().await;
        Ok(tokens.replace(token).access_token.clone())
    }

    /// One request against the player endpoint. The retry attempt accepts
    /// nothing but a track; everything else counts as an auth failure.
    async fn attempt(&self, token: &str, attempt: Attempt) -> Result<Step, PollError> {
        let response = player::currently_playing(&self.client, &self.api_url, token)
            .await
            .map_err(|e| PollError::Network(e.to_string()))?;

        match (response, attempt) {
            (PlayerResponse::Playing(body), _) => match player::snapshot(body) {
                Some(track) => Ok(Step::Done(Some(track))),
                None if attempt == Attempt::First => Ok(Step::Done(None)),
                None => Err(PollError::Unauthorized(
                    "retry returned no track".to_string(),
                )),
            },
            (PlayerResponse::NoContent, Attempt::First) => Ok(Step::Done(None)),
            (PlayerResponse::Unauthorized, Attempt::First) => Ok(Step::Reauthorize),
            (PlayerResponse::Rejected(status), Attempt::First) => {
                Err(PollError::Rejected(status.as_u16()))
            }
            (other, Attempt::Retry) => Err(PollError::Unauthorized(format!(
                "retry answered {:?}",
                other
            ))),
        }
    }
}

#[async_trait]
impl NowPlayingSource for SpotifySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Spotify
    }

    async fn fetch_current_track(&self) -> Result<Option<TrackSnapshot>, PollError> {
        let mut token = match self.current_token().await {
            Some(token) => token,
            None => self
                .refresh()
                .await
                .map_err(|e| PollError::TokenUnavailable(e.to_string()))?,
        };

        let mut attempt = Attempt::First;
        loop {
            match self.attempt(&token, attempt).await? {
                Step::Done(track) => return Ok(track),
                Step::Reauthorize => {
                    token = self
                        .refresh()
                        .await
                        .map_err(|e| PollError::Unauthorized(e.to_string()))?;
                    attempt = Attempt::Retry;
                }
            }
        }
    }
}

/// Reads the track from the presence aggregator feed.
pub struct PresenceSource {
    client: Client,
    base_url: String,
    user_id: String,
}

impl PresenceSource {
    pub fn new(client: Client, base_url: &str, user_id: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }
}

#[async_trait]
impl NowPlayingSource for PresenceSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Presence
    }

    async fn fetch_current_track(&self) -> Result<Option<TrackSnapshot>, PollError> {
        let outcome = presence::fetch_presence(&self.client, &self.base_url, &self.user_id)
            .await
            .map_err(|e| PollError::PresenceNetwork(e.to_string()))?;

        match outcome {
            PresenceOutcome::Listening(track) => Ok(Some(track)),
            PresenceOutcome::Idle => Ok(None),
            PresenceOutcome::Rejected(status) => Err(PollError::PresenceRejected(status.as_u16())),
        }
    }
}
