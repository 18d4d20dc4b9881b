use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio::config::{Config, Credentials, Endpoints};
use folio::nowplaying::{
    Diagnostics, NowPlayingSource, PollError, PollState, SpotifySource, Widget,
};
use reqwest::Client;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYER_PATH: &str = "/v1/me/player/currently-playing";
const TOKEN_PATH: &str = "/api/token";

#[derive(Default)]
struct Recorder {
    errors: Mutex<Vec<PollError>>,
}

impl Diagnostics for Recorder {
    fn poll_failed(&self, error: &PollError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

fn credentials() -> Credentials {
    Credentials {
        client_id: Some("id".to_string()),
        client_secret: Some("secret".to_string()),
        refresh_token: Some("refresh".to_string()),
    }
}

fn config(server: &MockServer, access_token: Option<&str>, credentials: Credentials) -> Config {
    Config {
        credentials,
        access_token: access_token.map(String::from),
        endpoints: Endpoints::with_base(&server.uri()),
        ..Config::default()
    }
}

fn widget(config: &Config) -> (Widget, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let source = Arc::new(SpotifySource::new(Client::new(), config));
    let widget = Widget::new(source, recorder.clone(), Duration::from_secs(3));
    (widget, recorder)
}

fn playing_body() -> Value {
    json!({
        "is_playing": true,
        "item": {
            "name": "Teardrop",
            "artists": [{ "name": "Massive Attack" }, { "name": "Elizabeth Fraser" }, { "name": "Third" }],
            "album": {
                "name": "Mezzanine",
                "images": [
                    { "url": "A", "height": 64, "width": 64 },
                    { "url": "B", "height": 300, "width": 300 },
                    { "url": "C", "height": 150, "width": 150 }
                ]
            }
        }
    })
}

async fn mount_token(server: &MockServer, status: u16, body: Value, expected: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_player(server: &MockServer, bearer: &str, template: ResponseTemplate, expected: u64) {
    Mock::given(method("GET"))
        .and(path(PLAYER_PATH))
        .and(header("authorization", format!("Bearer {}", bearer).as_str()))
        .respond_with(template)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn no_content_hides_without_error() {
    let server = MockServer::start().await;
    mount_player(&server, "current", ResponseTemplate::new(204), 1).await;

    let (widget, recorder) = widget(&config(&server, Some("current"), credentials()));
    let state = widget.poll().await;

    assert_eq!(state, PollState::Hidden(None));
    assert!(recorder.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn playing_track_is_shown() {
    let server = MockServer::start().await;
    mount_player(
        &server,
        "current",
        ResponseTemplate::new(200).set_body_json(playing_body()),
        1,
    )
    .await;

    let (widget, _) = widget(&config(&server, Some("current"), credentials()));
    let state = widget.poll().await;

    let track = state.track().expect("track is shown");
    assert_eq!(track.name, "Teardrop");
    assert_eq!(track.artist_line(), "Massive Attack, Elizabeth Fraser, Third");
    assert_eq!(track.album_art_url.as_deref(), Some("B"));
    assert!(track.is_playing);
}

#[tokio::test]
async fn null_item_hides_without_error() {
    let server = MockServer::start().await;
    mount_player(
        &server,
        "current",
        ResponseTemplate::new(200).set_body_json(json!({ "is_playing": false, "item": null })),
        1,
    )
    .await;

    let (widget, recorder) = widget(&config(&server, Some("current"), credentials()));

    assert_eq!(widget.poll().await, PollState::Hidden(None));
    assert!(recorder.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unauthorized_refreshes_once_and_retries_once() {
    let server = MockServer::start().await;
    mount_player(&server, "stale", ResponseTemplate::new(401), 1).await;
    mount_player(
        &server,
        "fresh",
        ResponseTemplate::new(200).set_body_json(playing_body()),
        1,
    )
    .await;
    mount_token(
        &server,
        200,
        json!({ "access_token": "fresh", "expires_in": 3600 }),
        1,
    )
    .await;

    let config = config(&server, Some("stale"), credentials());
    let source = Arc::new(SpotifySource::new(Client::new(), &config));
    let widget = Widget::new(
        source.clone(),
        Arc::new(Recorder::default()),
        Duration::from_secs(3),
    );

    let state = widget.poll().await;

    assert!(matches!(state, PollState::Showing(ref track) if track.name == "Teardrop"));
    assert_eq!(source.current_token().await.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn refreshed_token_is_used_on_next_tick() {
    let server = MockServer::start().await;
    mount_player(&server, "stale", ResponseTemplate::new(401), 1).await;
    mount_player(&server, "fresh", ResponseTemplate::new(204), 2).await;
    mount_token(
        &server,
        200,
        json!({ "access_token": "fresh", "expires_in": 3600 }),
        1,
    )
    .await;

    let config = config(&server, Some("stale"), credentials());
    let (widget, _) = widget(&config);

    // the retry accepts nothing but a track
    assert_eq!(
        widget.poll().await.error().map(|e| e.to_string()).as_deref(),
        Some("Invalid or expired access token")
    );
    assert_eq!(widget.poll().await, PollState::Hidden(None));
}

#[tokio::test]
async fn unauthorized_with_failed_refresh_hides_with_error() {
    let server = MockServer::start().await;
    mount_player(&server, "stale", ResponseTemplate::new(401), 1).await;
    mount_token(&server, 400, json!({ "error": "invalid_grant" }), 1).await;

    let (widget, recorder) = widget(&config(&server, Some("stale"), credentials()));
    let state = widget.poll().await;

    let error = state.error().expect("error indicator");
    assert!(matches!(error, PollError::Unauthorized(_)));
    assert_eq!(error.to_string(), "Invalid or expired access token");
    assert!(error.detail().contains("invalid_grant"));
    assert_eq!(recorder.errors.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unauthorized_retry_is_not_repeated() {
    let server = MockServer::start().await;
    mount_player(&server, "stale", ResponseTemplate::new(401), 1).await;
    mount_player(&server, "fresh", ResponseTemplate::new(401), 1).await;
    mount_token(
        &server,
        200,
        json!({ "access_token": "fresh", "expires_in": 3600 }),
        1,
    )
    .await;

    let (widget, _) = widget(&config(&server, Some("stale"), credentials()));
    let state = widget.poll().await;

    assert!(matches!(state.error(), Some(PollError::Unauthorized(_))));
}

#[tokio::test]
async fn other_failure_status_is_rejected() {
    let server = MockServer::start().await;
    mount_player(&server, "current", ResponseTemplate::new(503), 1).await;
    mount_token(&server, 200, json!({}), 0).await;

    let (widget, _) = widget(&config(&server, Some("current"), credentials()));
    let state = widget.poll().await;

    assert_eq!(state, PollState::Hidden(Some(PollError::Rejected(503))));
    assert_eq!(
        state.error().unwrap().to_string(),
        "Failed to fetch currently playing track"
    );
}

#[tokio::test]
async fn missing_token_and_credentials_makes_no_request() {
    let server = MockServer::start().await;

    let (widget, recorder) = widget(&config(&server, None, Credentials::default()));
    let state = widget.poll().await;

    let error = state.error().expect("error indicator");
    assert_eq!(error.to_string(), "Spotify access token not configured");
    assert_eq!(error.detail(), "Missing Spotify credentials");
    assert_eq!(recorder.errors.lock().unwrap().len(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_token_is_refreshed_before_first_fetch() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        200,
        json!({ "access_token": "fresh", "expires_in": 3600 }),
        1,
    )
    .await;
    mount_player(
        &server,
        "fresh",
        ResponseTemplate::new(200).set_body_json(playing_body()),
        1,
    )
    .await;

    let (widget, _) = widget(&config(&server, None, credentials()));

    assert!(matches!(widget.poll().await, PollState::Showing(_)));
}

#[tokio::test]
async fn token_about_to_expire_is_refreshed_before_use() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        200,
        json!({ "access_token": "short-lived", "expires_in": 30 }),
        2,
    )
    .await;
    mount_player(&server, "short-lived", ResponseTemplate::new(204), 2).await;

    let (widget, _) = widget(&config(&server, None, credentials()));

    assert_eq!(widget.poll().await, PollState::Hidden(None));
    assert_eq!(widget.poll().await, PollState::Hidden(None));
}

#[tokio::test]
async fn unreachable_api_is_network_error() {
    let config = Config {
        access_token: Some("current".to_string()),
        endpoints: Endpoints::with_base("http://127.0.0.1:1"),
        ..Config::default()
    };
    let source = SpotifySource::new(Client::new(), &config);

    let error = source.fetch_current_track().await.unwrap_err();

    assert!(matches!(error, PollError::Network(_)));
    assert_eq!(error.to_string(), "Error connecting to Spotify API");
}
