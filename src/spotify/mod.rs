//! # Spotify Integration Module
//!
//! Thin client for the two Spotify endpoints the site needs:
//!
//! - [`auth`] - the accounts service: refresh-token exchange for the widget,
//!   and the authorization-code flow used by the `token` helper command
//! - [`player`] - `GET /me/player/currently-playing`
//!
//! ## Authentication Strategy
//!
//! The site authenticates as one fixed user. A long-lived refresh credential
//! and the application's client id and secret live in configuration; access
//! tokens are minted on demand with HTTP Basic authentication and are kept in
//! memory only. The `token` helper mints the first refresh credential through
//! a local callback listener.
//!
//! ## Error Types
//!
//! - [`auth::RefreshError`] - structured refresh failures, never panics
//! - `reqwest::Error` - transport and decoding errors of the player endpoint
//! - `String` - helper flow failures shown to the operator

pub mod auth;
pub mod player;
