//! # CLI Module
//!
//! User-facing commands. Each command receives the [`Config`] built once in
//! `main`, talks to the library modules and reports through the coloured
//! output macros. Fatal problems end the process with exit code 1.
//!
//! - [`serve`] - runs the site with a mounted now-playing widget
//! - [`now_playing`] - polls the configured source once and prints the result
//! - [`refresh`] - calls the token refresh endpoint once
//! - [`token`] - mints the initial access and refresh tokens
//!
//! [`Config`]: crate::config::Config

mod now_playing;
mod refresh;
mod serve;
mod token;

pub use now_playing::now_playing;
pub use refresh::refresh;
pub use serve::serve;
pub use token::token;
