use std::time::Duration;

use reqwest::Client;

use crate::{config::Config, error, info, spotify, success, warning};

const MAX_WAIT: Duration = Duration::from_secs(120);

/// Mints the initial access and refresh tokens and prints them as
/// environment lines to paste into the configuration.
pub async fn token(config: Config) {
    if config.credentials.client().is_none() {
        error!(
            "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required.\nSet them in the environment or in .env.local."
        );
    }

    info!("Opening browser for authorization...");
    info!("After authorizing, you'll be redirected back to {}.", config.redirect_uri);

    match spotify::auth::authorize(&config, Client::new(), MAX_WAIT).await {
        Ok(token) => {
            success!("Tokens received! Add these to your .env.local file:");
            println!();
            println!("SPOTIFY_ACCESS_TOKEN={}", token.access_token);
            if let Some(refresh_token) = &token.refresh_token {
                println!("SPOTIFY_REFRESH_TOKEN={}", refresh_token);
            }
            println!();
            warning!("Access tokens expire after 1 hour.");
            if token.refresh_token.is_some() {
                info!("The refresh token is used to get new access tokens automatically.");
            }
        }
        Err(e) => error!("{}", e),
    }
}
