use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, http::StatusCode, response::Html};
use tokio::sync::Mutex;

use crate::{spotify::auth::CodeExchange, types::AuthSession, utils::escape_html, warning};

type Reply = (StatusCode, Html<String>);

fn page(status: StatusCode, heading: &str, body: &str) -> Reply {
    (
        status,
        Html(format!(
            "<html><body style=\"font-family: monospace; padding: 20px;\"><h1>{}</h1><p>{}</p></body></html>",
            heading, body
        )),
    )
}

/// Callback of the token helper's authorization-code flow.
///
/// Records the outcome in the shared session; the waiting helper picks it up.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthSession>>>>,
    Extension(exchange): Extension<CodeExchange>,
) -> Reply {
    let expected_state = {
        let lock = shared_state.lock().await;
        match lock.as_ref() {
            Some(session) if session.outcome.is_none() => session.state.clone(),
            _ => {
                return page(
                    StatusCode::BAD_REQUEST,
                    "No authorization in progress",
                    "Start the token helper again.",
                );
            }
        }
    };

    let (outcome, reply) = if let Some(error) = params.get("error") {
        (
            Err(format!("Authorization denied: {}", error)),
            page(
                StatusCode::BAD_REQUEST,
                "Authorization Error",
                &format!("Error: {}. Please try again.", escape_html(error)),
            ),
        )
    } else if params.get("state") != Some(&expected_state) {
        (
            Err("Authorization state mismatch".to_string()),
            page(StatusCode::BAD_REQUEST, "Authorization Error", "State mismatch."),
        )
    } else if let Some(code) = params.get("code") {
        match exchange.exchange(code).await {
            Ok(token) => (
                Ok(token),
                page(
                    StatusCode::OK,
                    "Success!",
                    "Your tokens have been generated. Check the terminal. You can close this window.",
                ),
            ),
            Err(e) => {
                warning!("Token exchange failed: {}", e);
                let body = format!("Error: {}", escape_html(&e));
                (Err(e), page(StatusCode::INTERNAL_SERVER_ERROR, "Login failed", &body))
            }
        }
    } else {
        (
            Err("No authorization code received".to_string()),
            page(
                StatusCode::BAD_REQUEST,
                "Authorization Error",
                "No authorization code received.",
            ),
        )
    };

    if let Some(session) = shared_state.lock().await.as_mut() {
        session.outcome = Some(outcome);
    }
    reply
}
