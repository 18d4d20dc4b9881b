use axum::{Extension, response::Html, response::Json};

use crate::{api::SiteState, nowplaying::render, types::NowPlayingStatus};

/// Widget fragment; an empty body when nothing is shown.
pub async fn now_playing_fragment(Extension(site): Extension<SiteState>) -> Html<String> {
    let html = site
        .widget
        .as_ref()
        .and_then(|widget| render::now_playing_html(&widget.current(), widget.kind));
    Html(html.unwrap_or_default())
}

/// Widget state as JSON. Error indicators are left out.
pub async fn now_playing_status(Extension(site): Extension<SiteState>) -> Json<NowPlayingStatus> {
    let status = match &site.widget {
        Some(widget) => {
            let state = widget.current();
            NowPlayingStatus {
                state: state.label(),
                track: state.track().cloned(),
            }
        }
        None => NowPlayingStatus {
            state: "disabled",
            track: None,
        },
    };
    Json(status)
}
