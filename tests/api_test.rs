use std::net::SocketAddr;
use std::sync::Arc;

use folio::api::{SiteState, WidgetView};
use folio::config::{Config, Credentials, Endpoints, SiteProfile, SourceKind};
use folio::nowplaying::{PollError, PollState};
use folio::server;
use folio::spotify::auth::CodeExchange;
use folio::types::{AuthSession, TrackSnapshot};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn track() -> TrackSnapshot {
    TrackSnapshot {
        name: "Song".to_string(),
        artists: vec!["A".to_string(), "B".to_string()],
        album_art_url: Some("https://img/b.png".to_string()),
        is_playing: true,
    }
}

async fn start_site(config: Config, state: Option<PollState>) -> (SocketAddr, CancellationToken) {
    let widget = state.map(|state| WidgetView {
        kind: SourceKind::Spotify,
        state: watch::channel(state).1,
    });
    let site = SiteState {
        config: Arc::new(config),
        client: Client::new(),
        widget,
    };

    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let stop = shutdown.clone();
    tokio::spawn(async move {
        server::start_site_server(listener, site, stop).await.unwrap();
    });
    (addr, shutdown)
}

#[tokio::test]
async fn index_renders_profile_and_widget() {
    let config = Config {
        site_url: Some("https://example.com".to_string()),
        profile: SiteProfile {
            title: "Ada".to_string(),
            ..SiteProfile::default()
        },
        ..Config::default()
    };
    let (addr, shutdown) = start_site(config, Some(PollState::Showing(track()))).await;

    let html = reqwest::get(format!("http://{}/", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("<title>Ada</title>"));
    assert!(html.contains("https://example.com/opengraph-image.png"));
    assert!(html.contains(">A, B<"));
    shutdown.cancel();
}

#[tokio::test]
async fn fragment_is_empty_when_hidden_by_error() {
    let state = PollState::Hidden(Some(PollError::Network("connection refused".to_string())));
    let (addr, shutdown) = start_site(Config::default(), Some(state)).await;

    let res = reqwest::get(format!("http://{}/now-playing", addr)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();

    assert!(body.is_empty());
    shutdown.cancel();
}

#[tokio::test]
async fn status_reports_state_without_errors() {
    let state = PollState::Hidden(Some(PollError::Rejected(500)));
    let (addr, shutdown) = start_site(Config::default(), Some(state)).await;

    let status: Value = reqwest::get(format!("http://{}/api/now-playing", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status, json!({ "state": "hidden", "track": null }));
    shutdown.cancel();
}

#[tokio::test]
async fn status_without_widget_is_disabled() {
    let (addr, shutdown) = start_site(Config::default(), None).await;

    let status: Value = reqwest::get(format!("http://{}/api/now-playing", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["state"], "disabled");
    shutdown.cancel();
}

#[tokio::test]
async fn refresh_route_reports_missing_credentials() {
    let (addr, shutdown) = start_site(Config::default(), None).await;

    let body: Value = Client::new()
        .post(format!("http://{}/api/spotify/refresh", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "error": "Missing Spotify credentials" }));
    shutdown.cancel();
}

#[tokio::test]
async fn refresh_route_returns_new_token() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let config = Config {
        credentials: Credentials {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
        },
        endpoints: Endpoints::with_base(&upstream.uri()),
        ..Config::default()
    };
    let (addr, shutdown) = start_site(config, None).await;

    let body: Value = Client::new()
        .post(format!("http://{}/api/spotify/refresh", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "access_token": "fresh", "expires_in": 3600 }));
    shutdown.cancel();
}

#[tokio::test]
async fn refresh_route_keeps_upstream_detail_private() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant: token revoked"))
        .expect(1)
        .mount(&upstream)
        .await;

    let config = Config {
        credentials: Credentials {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
        },
        endpoints: Endpoints::with_base(&upstream.uri()),
        ..Config::default()
    };
    let (addr, shutdown) = start_site(config, None).await;

    let res = Client::new()
        .post(format!("http://{}/api/spotify/refresh", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body, json!({ "error": "Failed to refresh token" }));
    shutdown.cancel();
}

#[tokio::test]
async fn health_reports_widget_state() {
    let (addr, shutdown) = start_site(Config::default(), Some(PollState::Loading)).await;

    let body: Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["now_playing"]["source"], "spotify");
    assert_eq!(body["now_playing"]["state"], "loading");
    shutdown.cancel();
}

fn code_exchange(upstream: &MockServer) -> CodeExchange {
    CodeExchange {
        client: Client::new(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:3001/callback".to_string(),
        token_url: format!("{}/api/token", upstream.uri()),
    }
}

async fn start_callback(
    upstream: &MockServer,
) -> (SocketAddr, Arc<Mutex<Option<AuthSession>>>) {
    let session = Arc::new(Mutex::new(Some(AuthSession {
        state: "expected".to_string(),
        outcome: None,
    })));
    let exchange = code_exchange(upstream);

    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_session = Arc::clone(&session);
    tokio::spawn(async move {
        let _ = server::start_callback_server(listener, server_session, exchange).await;
    });
    (addr, session)
}

#[tokio::test]
async fn callback_exchanges_code_for_tokens() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access",
            "refresh_token": "refresh",
            "scope": "user-read-currently-playing",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let (addr, session) = start_callback(&upstream).await;
    let res = reqwest::get(format!("http://{}/callback?code=abc&state=expected", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let outcome = session.lock().await.as_ref().unwrap().outcome.clone();
    let token = outcome.expect("outcome recorded").expect("tokens");
    assert_eq!(token.access_token, "access");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
}

#[tokio::test]
async fn callback_rejects_state_mismatch_and_errors() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let (addr, session) = start_callback(&upstream).await;
    let res = reqwest::get(format!("http://{}/callback?code=abc&state=forged", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let outcome = session.lock().await.as_ref().unwrap().outcome.clone();
    assert!(matches!(outcome, Some(Err(_))));

    let (addr, session) = start_callback(&upstream).await;
    let res = reqwest::get(format!("http://{}/callback?error=access_denied", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let outcome = session.lock().await.as_ref().unwrap().outcome.clone();
    assert_eq!(outcome, Some(Err("Authorization denied: access_denied".to_string())));
}

#[tokio::test]
async fn callback_reports_failed_exchange() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&upstream)
        .await;

    let (addr, session) = start_callback(&upstream).await;
    let res = reqwest::get(format!("http://{}/callback?code=abc&state=expected", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let outcome = session.lock().await.as_ref().unwrap().outcome.clone();
    assert_eq!(
        outcome,
        Some(Err("Token exchange failed: invalid_grant".to_string()))
    );
}

#[tokio::test]
async fn callback_router_without_pending_session_is_rejected() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let session: Arc<Mutex<Option<AuthSession>>> = Arc::new(Mutex::new(None));
    let router = server::callback_router(Arc::clone(&session), code_exchange(&upstream));
    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let res = reqwest::get(format!("http://{}/callback?code=abc&state=any", addr))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(session.lock().await.is_none());
}
