//! # API Module
//!
//! HTTP handlers for the two servers the binary runs:
//!
//! - the site (`folio serve`): [`index`], [`now_playing_fragment`],
//!   [`now_playing_status`], [`refresh`] and [`health`]
//! - the token helper's temporary listener (`folio token`): [`callback`]
//!
//! Site handlers share a [`SiteState`] through an axum `Extension`. The
//! widget state is read from its watch channel, so handlers never trigger
//! upstream calls themselves, except the refresh route which is the token
//! refresh endpoint exposed over HTTP.

mod callback;
mod health;
mod index;
mod now_playing;
mod refresh;

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::watch;

use crate::{
    config::{Config, SourceKind},
    nowplaying::{PollState, WidgetHandle},
};

pub use callback::callback;
pub use health::health;
pub use index::index;
pub use now_playing::{now_playing_fragment, now_playing_status};
pub use refresh::refresh;

/// Read side of a mounted widget.
#[derive(Clone)]
pub struct WidgetView {
    pub kind: SourceKind,
    pub state: watch::Receiver<PollState>,
}

impl WidgetView {
    pub fn of(handle: &WidgetHandle) -> Self {
        Self {
            kind: handle.kind(),
            state: handle.subscribe(),
        }
    }

    pub fn current(&self) -> PollState {
        self.state.borrow().clone()
    }
}

#[derive(Clone)]
pub struct SiteState {
    pub config: Arc<Config>,
    pub client: Client,
    /// `None` when no source could be built.
    pub widget: Option<WidgetView>,
}
