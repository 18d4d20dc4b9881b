use std::net::SocketAddr;

use axum::{Extension, extract::ConnectInfo, http::StatusCode, response::Json};

use crate::{
    api::SiteState, spotify::auth::refresh_access_token, types::RefreshResponse, warning,
};

/// The widget refreshes in-process, so the route only serves local callers.
pub fn is_trusted_peer(peer: &SocketAddr) -> bool {
    peer.ip().is_loopback()
}

/// Token refresh endpoint. Answers 200 with either the new token or an
/// `error` message, so callers branch on the body rather than the status.
/// Upstream detail is logged, never returned.
pub async fn refresh(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Extension(site): Extension<SiteState>,
) -> (StatusCode, Json<RefreshResponse>) {
    if !is_trusted_peer(&peer) {
        warning!("Refused token refresh from {}", peer);
        return (
            StatusCode::FORBIDDEN,
            Json(RefreshResponse::Error {
                error: "Forbidden".to_string(),
            }),
        );
    }

    let result = refresh_access_token(
        &site.client,
        &site.config.credentials,
        &site.config.endpoints.token_url,
    )
    .await;

    let body = match result {
        Ok(token) => RefreshResponse::Token {
            access_token: token.access_token,
            expires_in: token.expires_in,
        },
        Err(e) => {
            warning!("Token refresh failed: {}", e);
            RefreshResponse::Error {
                error: e.public_message().to_string(),
            }
        }
    };
    (StatusCode::OK, Json(body))
}
