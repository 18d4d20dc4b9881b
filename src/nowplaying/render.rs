use crate::{
    config::SourceKind,
    nowplaying::PollState,
    presence::{ARTIST_MAX_CHARS, TITLE_MAX_CHARS},
    utils,
};

/// Text and art of a visible widget, before HTML encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingView {
    pub title: String,
    pub artists: String,
    pub album_art_url: Option<String>,
}

/// Decides what the widget shows. `Loading` and `Hidden` show nothing,
/// whatever the reason.
pub fn view(state: &PollState, kind: SourceKind) -> Option<NowPlayingView> {
    let track = state.track()?;
    let artists = track.artist_line();

    let (title, artists) = match kind {
        SourceKind::Spotify => (track.name.clone(), artists),
        SourceKind::Presence => (
            utils::truncate(&track.name, TITLE_MAX_CHARS),
            utils::truncate(&artists, ARTIST_MAX_CHARS),
        ),
    };

    Some(NowPlayingView {
        title,
        artists,
        album_art_url: track.album_art_url.clone(),
    })
}

/// HTML fragment for the widget container, `None` when nothing is shown.
pub fn now_playing_html(state: &PollState, kind: SourceKind) -> Option<String> {
    let view = view(state, kind)?;
    let title = utils::escape_html(&view.title);
    let artists = utils::escape_html(&view.artists);

    let mut html = String::from("<div class=\"now-playing\">");
    html.push_str("<div class=\"now-playing-text\">");
    html.push_str(&format!("<p class=\"now-playing-title\">{}</p>", title));
    html.push_str(&format!("<p class=\"now-playing-artists\">{}</p>", artists));
    html.push_str("</div>");
    if let Some(url) = &view.album_art_url {
        html.push_str(&format!(
            "<img class=\"now-playing-art\" src=\"{src}\" alt=\"{title} by {artists}\">",
            src = utils::escape_html(url),
            title = title,
            artists = artists,
        ));
    }
    html.push_str("</div>");
    Some(html)
}
