use std::{sync::Arc, time::Duration};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url, header::AUTHORIZATION};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    Res,
    config::{Config, Credentials},
    server,
    types::{AccessToken, AuthSession, Token, TokenResponse},
    utils, warning,
};

/// Scopes needed to read the currently playing track.
pub const SCOPES: &str = "user-read-currently-playing user-read-playback-state";

/// Seconds assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Failure of a refresh call, returned as a value so callers can branch on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("Missing Spotify credentials")]
    MissingCredentials,

    #[error("Failed to refresh token: {0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),
}

impl RefreshError {
    /// Message safe to hand to an HTTP caller. Upstream response text stays
    /// in the `Display` output, which is only logged.
    pub fn public_message(&self) -> &'static str {
        match self {
            RefreshError::MissingCredentials => "Missing Spotify credentials",
            RefreshError::Rejected(_) | RefreshError::Transport(_) => "Failed to refresh token",
        }
    }

    fn transport(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        if message.is_empty() {
            RefreshError::Transport("Unknown error".to_string())
        } else {
            RefreshError::Transport(message)
        }
    }
}

/// Exchanges the configured refresh credential for a new access token.
///
/// Sends `grant_type=refresh_token` to the token endpoint with HTTP Basic
/// authentication built from the client id and secret. Nothing is retained
/// between calls.
///
/// # Errors
///
/// - [`RefreshError::MissingCredentials`] when any credential is absent; no
///   request is sent in that case
/// - [`RefreshError::Rejected`] with the response body on a non-success status
/// - [`RefreshError::Transport`] when the request fails or the body is not
///   the expected JSON
///
/// # Example
///
/// ```
/// let token = refresh_access_token(&client, &config.credentials, &config.endpoints.token_url).await?;
/// println!("Token valid for {} seconds", token.expires_in);
/// ```
pub async fn refresh_access_token(
    client: &Client,
    credentials: &Credentials,
    token_url: &str,
) -> Result<AccessToken, RefreshError> {
    let Some((client_id, client_secret, refresh_token)) = credentials.complete() else {
        return Err(RefreshError::MissingCredentials);
    };

    let res = client
        .post(token_url)
        .header(AUTHORIZATION, utils::basic_auth_header(client_id, client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(RefreshError::transport)?;

    if !res.status().is_success() {
        let text = res.text().await.map_err(RefreshError::transport)?;
        return Err(RefreshError::Rejected(text));
    }

    let json: TokenResponse = res.json().await.map_err(RefreshError::transport)?;

    Ok(AccessToken {
        access_token: json.access_token,
        expires_in: json.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        obtained_at: Utc::now(),
    })
}

/// Everything the callback handler needs to trade a code for tokens.
#[derive(Debug, Clone)]
pub struct CodeExchange {
    pub client: Client,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
}

impl CodeExchange {
    /// Exchanges an authorization code for the initial access and refresh
    /// tokens.
    pub async fn exchange(&self, code: &str) -> Result<Token, String> {
        let res = self
            .client
            .post(&self.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_auth_header(&self.client_id, &self.client_secret),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let text = res.text().await.map_err(|e| e.to_string())?;
            return Err(format!("Token exchange failed: {}", text));
        }

        res.json::<Token>().await.map_err(|e| e.to_string())
    }
}

/// Builds the Spotify authorization URL for the helper flow.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Res<String> {
    let url = Url::parse_with_params(
        auth_url,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("scope", SCOPES),
            ("redirect_uri", redirect_uri),
            ("show_dialog", "false"),
            ("state", state),
        ],
    )?;
    Ok(url.to_string())
}

/// Runs the authorization-code flow used to mint the initial tokens.
///
/// 1. Binds the temporary callback listener
/// 2. Opens the authorization URL in the default browser
/// 3. Waits for the callback handler to finish the code exchange
///
/// Returns the token grant, or a message describing why the flow failed.
pub async fn authorize(
    config: &Config,
    client: Client,
    max_wait: Duration,
) -> Result<Token, String> {
    let Some((client_id, client_secret)) = config.credentials.client() else {
        return Err("SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required".to_string());
    };

    let state = utils::generate_state();
    let auth_url = authorize_url(
        &config.endpoints.auth_url,
        client_id,
        &config.redirect_uri,
        &state,
    )
    .map_err(|e| format!("Invalid authorization URL: {}", e))?;

    let shared_state: Arc<Mutex<Option<AuthSession>>> = Arc::new(Mutex::new(Some(AuthSession {
        state,
        outcome: None,
    })));

    let exchange = CodeExchange {
        client,
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        redirect_uri: config.redirect_uri.clone(),
        token_url: config.endpoints.token_url.clone(),
    };

    let listener = server::bind(&config.token_helper_addr)
        .await
        .map_err(|e| format!("Cannot bind {}: {}", config.token_helper_addr, e))?;

    let server_state = Arc::clone(&shared_state);
    let server_task = tokio::spawn(async move {
        if let Err(e) = server::start_callback_server(listener, server_state, exchange).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_token(shared_state, max_wait).await;
    server_task.abort();

    outcome.unwrap_or_else(|| Err("Authorization timed out".to_string()))
}

/// Waits for the callback handler to record an outcome.
///
/// Polls the shared session once per second until an outcome is present or
/// `max_wait` has elapsed, showing a spinner meanwhile.
async fn wait_for_token(
    shared_state: Arc<Mutex<Option<AuthSession>>>,
    max_wait: Duration,
) -> Option<Result<Token, String>> {
    use std::time::Instant;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(outcome) = lock.as_ref().and_then(|session| session.outcome.clone()) {
            pb.finish_and_clear();
            return Some(outcome);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    None
}
