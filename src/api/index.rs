use axum::{Extension, response::Html};

use crate::{api::SiteState, nowplaying::render, page};

pub async fn index(Extension(site): Extension<SiteState>) -> Html<String> {
    let widget_html = site
        .widget
        .as_ref()
        .and_then(|widget| render::now_playing_html(&widget.current(), widget.kind));

    Html(page::render_index(
        &site.config.profile,
        site.config.site_url.as_deref(),
        widget_html.as_deref(),
        site.config.poll_interval,
    ))
}
