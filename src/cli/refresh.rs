use reqwest::Client;

use crate::{config::Config, error, spotify::auth::refresh_access_token, success};

/// Calls the token refresh endpoint once to check the configured credentials.
pub async fn refresh(config: Config) {
    match refresh_access_token(
        &Client::new(),
        &config.credentials,
        &config.endpoints.token_url,
    )
    .await
    {
        Ok(token) => success!(
            "Refresh credential is valid, new access token expires in {} seconds.",
            token.expires_in
        ),
        Err(e) => error!("{}", e),
    }
}
