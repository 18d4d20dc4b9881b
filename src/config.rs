//! Configuration management for the portfolio site.
//!
//! All settings are read from the process environment exactly once, into a
//! [`Config`] value that is passed explicitly to the refresh endpoint, the
//! now-playing sources and the HTTP surface. Environment files are loaded
//! first, in this order, without overriding variables that are already set:
//!
//! 1. `.env` in the local data directory (`~/.local/share/folio/.env` on Linux)
//! 2. `.env.local` in the working directory
//! 3. `.env` in the working directory

use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

use crate::Res;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_TOKEN_HELPER_ADDRESS: &str = "127.0.0.1:3001";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3001/callback";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const PRESENCE_API_URL: &str = "https://api.lanyard.rest";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown now-playing source '{0}' (expected 'spotify' or 'presence')")]
    UnknownSource(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Loads environment files into the process environment.
///
/// Creates the `folio` directory under the local data directory if it does
/// not exist yet. Missing files are skipped; only a failure to create the
/// directory is reported as an error.
pub async fn load_env() -> Res<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("folio/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    for candidate in [path, PathBuf::from(".env.local"), PathBuf::from(".env")] {
        if candidate.is_file() {
            dotenv::from_path(&candidate)?;
        }
    }

    Ok(())
}

/// Which implementation feeds the now-playing widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Spotify,
    Presence,
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(SourceKind::Spotify),
            "presence" | "lanyard" => Ok(SourceKind::Presence),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Spotify => f.write_str("spotify"),
            SourceKind::Presence => f.write_str("presence"),
        }
    }
}

/// Spotify application credentials plus the long-lived refresh credential.
///
/// Every field is optional so that a partially configured deployment still
/// starts; the refresh endpoint reports the missing pieces per call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// Returns `(client_id, client_secret, refresh_token)` when all three are
    /// present and non-empty.
    pub fn complete(&self) -> Option<(&str, &str, &str)> {
        Some((
            non_empty(&self.client_id)?,
            non_empty(&self.client_secret)?,
            non_empty(&self.refresh_token)?,
        ))
    }

    /// Returns `(client_id, client_secret)` when both are present.
    pub fn client(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.client_id)?, non_empty(&self.client_secret)?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("client_id", &redact(&self.client_id))
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Upstream base URLs. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub token_url: String,
    pub auth_url: String,
    pub presence_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: SPOTIFY_API_URL.to_string(),
            token_url: SPOTIFY_API_TOKEN_URL.to_string(),
            auth_url: SPOTIFY_API_AUTH_URL.to_string(),
            presence_url: PRESENCE_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at one base URL, using the same paths the real
    /// services expose.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_url: format!("{base}/v1"),
            token_url: format!("{base}/api/token"),
            auth_url: format!("{base}/authorize"),
            presence_url: base.to_string(),
        }
    }
}

/// Texts shown on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub title: String,
    pub description: String,
    pub bio: Vec<String>,
    pub links: Vec<(String, String)>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: "Engineer".to_string(),
            bio: vec!["I build things to learn how they break.".to_string()],
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub access_token: Option<String>,
    pub presence_user_id: Option<String>,
    pub source: SourceKind,
    pub site_url: Option<String>,
    pub server_addr: String,
    pub token_helper_addr: String,
    pub redirect_uri: String,
    pub poll_interval: Duration,
    pub endpoints: Endpoints,
    pub profile: SiteProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            access_token: None,
            presence_user_id: None,
            source: SourceKind::default(),
            site_url: None,
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            token_helper_addr: DEFAULT_TOKEN_HELPER_ADDRESS.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            endpoints: Endpoints::default(),
            profile: SiteProfile::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let source = match get("NOW_PLAYING_SOURCE") {
            Some(value) => value.parse()?,
            None => SourceKind::default(),
        };

        let poll_interval = match get("POLL_INTERVAL_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "POLL_INTERVAL_SECS",
                        value,
                    });
                }
            },
            None => defaults.poll_interval,
        };

        let endpoints = Endpoints {
            api_url: get("SPOTIFY_API_URL").unwrap_or(defaults.endpoints.api_url),
            token_url: get("SPOTIFY_API_TOKEN_URL").unwrap_or(defaults.endpoints.token_url),
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or(defaults.endpoints.auth_url),
            presence_url: get("PRESENCE_API_URL").unwrap_or(defaults.endpoints.presence_url),
        };

        let profile = SiteProfile {
            title: get("SITE_TITLE").unwrap_or(defaults.profile.title),
            description: get("SITE_DESCRIPTION").unwrap_or(defaults.profile.description),
            bio: get("SITE_BIO")
                .map(|bio| split_list(&bio, '|'))
                .unwrap_or(defaults.profile.bio),
            links: get("SITE_LINKS")
                .map(|links| parse_links(&links))
                .unwrap_or_default(),
        };

        Ok(Self {
            credentials: Credentials {
                client_id: get("SPOTIFY_CLIENT_ID"),
                client_secret: get("SPOTIFY_CLIENT_SECRET"),
                refresh_token: get("SPOTIFY_REFRESH_TOKEN"),
            },
            access_token: get("SPOTIFY_ACCESS_TOKEN"),
            presence_user_id: get("PRESENCE_USER_ID"),
            source,
            site_url: get("SITE_URL").map(|url| url.trim_end_matches('/').to_string()),
            server_addr: get("SERVER_ADDRESS").unwrap_or(defaults.server_addr),
            token_helper_addr: get("TOKEN_HELPER_ADDRESS").unwrap_or(defaults.token_helper_addr),
            redirect_uri: get("SPOTIFY_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            poll_interval,
            endpoints,
            profile,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_links(value: &str) -> Vec<(String, String)> {
    split_list(value, ',')
        .into_iter()
        .filter_map(|pair| {
            let (label, url) = pair.split_once('=')?;
            Some((label.trim().to_string(), url.trim().to_string()))
        })
        .filter(|(label, url)| !label.is_empty() && !url.is_empty())
        .collect()
}
