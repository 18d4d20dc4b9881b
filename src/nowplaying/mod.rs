//! # Now-Playing Module
//!
//! Everything behind the "currently playing" widget:
//!
//! - [`source`] - the [`NowPlayingSource`] trait and its two implementations,
//!   direct Spotify polling with refresh and the presence aggregator feed
//! - [`widget`] - the per-instance poll state machine and its cancellable
//!   repeating task
//! - [`render`] - the HTML fragment shown on the page
//!
//! ## State Machine
//!
//! ```text
//! Loading ──poll──> Showing(track) <──poll──> Hidden(error?)
//! ```
//!
//! A widget starts in `Loading`, polls once immediately and then on a fixed
//! interval, and keeps cycling between `Showing` and `Hidden` until it is
//! unmounted. Errors only ever lead to `Hidden`; they are never rendered and
//! are reported through [`Diagnostics`] instead.

pub mod render;
pub mod source;
pub mod widget;

use thiserror::Error;

use crate::{info, types::TrackSnapshot, warning};

pub use source::{NowPlayingSource, PresenceSource, SpotifySource, select_source};
pub use widget::{Widget, WidgetHandle};

/// Why a tick ended hidden. `Display` is the indicator message; upstream
/// detail is kept separately for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Spotify access token not configured")]
    TokenUnavailable(String),

    #[error("Invalid or expired access token")]
    Unauthorized(String),

    #[error("Failed to fetch currently playing track")]
    Rejected(u16),

    #[error("Error connecting to Spotify API")]
    Network(String),

    #[error("Failed to fetch presence")]
    PresenceRejected(u16),

    #[error("Error connecting to presence service")]
    PresenceNetwork(String),
}

impl PollError {
    /// Upstream detail for logs. Never rendered.
    pub fn detail(&self) -> String {
        match self {
            PollError::TokenUnavailable(detail)
            | PollError::Unauthorized(detail)
            | PollError::Network(detail)
            | PollError::PresenceNetwork(detail) => detail.clone(),
            PollError::Rejected(status) | PollError::PresenceRejected(status) => {
                format!("HTTP status {}", status)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Loading,
    Showing(TrackSnapshot),
    /// Nothing to show; carries the error indicator when a failure caused it.
    Hidden(Option<PollError>),
}

impl PollState {
    pub fn track(&self) -> Option<&TrackSnapshot> {
        match self {
            PollState::Showing(track) => Some(track),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PollError> {
        match self {
            PollState::Hidden(error) => error.as_ref(),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PollState::Loading => "loading",
            PollState::Showing(_) => "showing",
            PollState::Hidden(_) => "hidden",
        }
    }
}

/// Observation seam for the widget. Every failed tick is reported, and every
/// change of state.
pub trait Diagnostics: Send + Sync {
    fn poll_failed(&self, error: &PollError);

    fn state_changed(&self, _state: &PollState) {}
}

/// Reports through the console output macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn poll_failed(&self, error: &PollError) {
        warning!("Now playing: {} ({})", error, error.detail());
    }

    fn state_changed(&self, state: &PollState) {
        match state {
            PollState::Showing(track) => {
                info!("Now playing: {} by {}", track.name, track.artist_line())
            }
            PollState::Hidden(None) => info!("Now playing: nothing"),
            PollState::Hidden(Some(_)) | PollState::Loading => {}
        }
    }
}
