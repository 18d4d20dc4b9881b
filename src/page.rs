//! Page shell.
//!
//! The page is rendered from configuration on every request; the widget
//! container is filled with the latest widget fragment and refreshed in the
//! browser from `GET /now-playing`.

use std::time::Duration;

use crate::{config::SiteProfile, utils::escape_html};

const OG_IMAGE: &str = "opengraph-image.png";

/// Social preview image URL, absolute when a public site URL is known.
pub fn og_image_url(site_url: Option<&str>) -> String {
    match site_url {
        Some(url) if !url.is_empty() => format!("{}/{}", url.trim_end_matches('/'), OG_IMAGE),
        _ => format!("/{}", OG_IMAGE),
    }
}

/// Renders the full HTML document.
pub fn render_index(
    profile: &SiteProfile,
    site_url: Option<&str>,
    widget_html: Option<&str>,
    refresh_every: Duration,
) -> String {
    let title = escape_html(&profile.title);
    let description = escape_html(&profile.description);
    let image = escape_html(&og_image_url(site_url));

    let mut head = String::new();
    head.push_str("<meta charset=\"utf-8\">");
    head.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    head.push_str(&format!("<title>{}</title>", title));
    head.push_str(&format!("<meta name=\"description\" content=\"{}\">", description));
    for (property, content) in [
        ("og:title", title.as_str()),
        ("og:description", description.as_str()),
        ("og:image", image.as_str()),
        ("og:type", "website"),
    ] {
        head.push_str(&format!(
            "<meta property=\"{}\" content=\"{}\">",
            property, content
        ));
    }
    for (name, content) in [
        ("twitter:card", "summary_large_image"),
        ("twitter:title", title.as_str()),
        ("twitter:description", description.as_str()),
        ("twitter:image", image.as_str()),
    ] {
        head.push_str(&format!("<meta name=\"{}\" content=\"{}\">", name, content));
    }

    let bio: String = profile
        .bio
        .iter()
        .map(|paragraph| format!("<p>{}</p>", escape_html(paragraph)))
        .collect();

    let links: String = profile
        .links
        .iter()
        .map(|(label, url)| {
            format!(
                "<a href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(label)
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>{head}</head>
<body>
<main>
<header><h1>{title}</h1><p>{description}</p></header>
<section class="bio">{bio}</section>
<section id="now-playing">{widget}</section>
<nav class="links">{links}</nav>
</main>
<script>
setInterval(function () {{
  fetch("/now-playing").then(function (r) {{ return r.text(); }}).then(function (html) {{
    document.getElementById("now-playing").innerHTML = html;
  }}).catch(function () {{}});
}}, {interval});
</script>
</body>
</html>
"#,
        head = head,
        title = title,
        description = description,
        bio = bio,
        widget = widget_html.unwrap_or_default(),
        links = links,
        interval = refresh_every.as_millis(),
    )
}
