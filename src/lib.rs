//! Portfolio site library
//!
//! This library serves a single portfolio page with a live "now playing"
//! widget. The widget is fed either by the Spotify Web API (with refresh-token
//! handling) or by a presence aggregator, selected by configuration at startup.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the site and the token helper callback
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loaded once from the environment
//! - `management` - In-memory access token bookkeeping
//! - `nowplaying` - Now-playing sources, widget state machine and rendering
//! - `page` - Page shell rendering
//! - `presence` - Presence aggregator client
//! - `server` - Local HTTP servers
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod nowplaying;
pub mod page;
pub mod presence;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for the application plumbing
/// using a boxed dynamic error trait object. Domain operations return their
/// own error enums instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Serving on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the program with exit code 1 right after printing. Only use it
/// for fatal errors in command handlers, never inside the widget or the
/// request handlers.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
