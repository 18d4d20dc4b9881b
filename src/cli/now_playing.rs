use std::sync::Arc;

use reqwest::Client;

use crate::{
    config::Config,
    error, info,
    nowplaying::{Diagnostics, PollError, PollState, Widget, render, select_source},
    success, warning,
};

/// Prints errors in full; a one-shot poll is run by the operator.
struct VerboseDiagnostics;

impl Diagnostics for VerboseDiagnostics {
    fn poll_failed(&self, error: &PollError) {
        warning!("{}: {}", error, error.detail());
    }
}

/// Polls the configured source once.
pub async fn now_playing(config: Config) {
    let Some(source) = select_source(&config, Client::new()) else {
        error!("No now-playing source is configured.");
    };

    let kind = source.kind();
    let widget = Widget::new(source, Arc::new(VerboseDiagnostics), config.poll_interval);

    let state = widget.poll().await;
    match render::view(&state, kind) {
        Some(view) => {
            success!("{} by {}", view.title, view.artists);
            if let Some(url) = view.album_art_url {
                info!("Album art: {}", url);
            }
        }
        None => match state {
            PollState::Hidden(Some(err)) => error!("{}", err),
            _ => info!("Nothing is playing."),
        },
    }
}
