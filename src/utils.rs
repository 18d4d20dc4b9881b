use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};

use crate::types::AlbumImage;

pub const ELLIPSIS: &str = "...";

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// `Authorization` header value for the Spotify token endpoint.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Picks the URL of the tallest image. The first image wins on ties and
/// images without a reported height count as zero.
pub fn select_album_art(images: &[AlbumImage]) -> Option<String> {
    let mut best: Option<&AlbumImage> = None;
    for image in images {
        match best {
            Some(current) if image.height.unwrap_or(0) <= current.height.unwrap_or(0) => {}
            _ => best = Some(image),
        }
    }
    best.map(|image| image.url.clone())
}

/// Cuts `text` to `max` characters and appends [`ELLIPSIS`] when it was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(max).collect();
    cut.push_str(ELLIPSIS);
    cut
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
