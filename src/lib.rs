//! Spotify Playlist Shuffler Library
//!
//! This library provides a small web service that reorders the tracks of the
//! playlists a Spotify user owns. It covers the OAuth authorization-code flow,
//! a cookie based session, a thin client for the few Spotify Web API endpoints
//! needed, and the fetch/shuffle/write-back routine itself.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the landing page, auth flow, listing and shuffling
//! - `config` - Configuration loaded once from environment variables and `.env`
//! - `error` - Request level error type and its mapping to HTTP responses
//! - `server` - Router construction and the listening loop
//! - `session` - Token cookie codec and cookie builders
//! - `shuffle` - Track extraction, permutation and batched write-back
//! - `spotify` - Authenticator and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Random state generation and small helpers
//!
//! # Example
//!
//! ```
//! use playlist_shuffler::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> playlist_shuffler::Res<()> {
//!     config::load_env()?;
//!     let config = config::Config::from_env()?;
//!     server::start_api_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod shuffle;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used for startup and bootstrap code where any error simply ends the
/// program. Request handling uses [`error::AppError`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Playlist {} shuffled", playlist_id);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for startup failures such as missing credentials. Request
/// handlers never call it; they log with [`warning!`] and answer with an
/// error status instead.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for every failure that ends a single request.
///
/// # Example
///
/// ```
/// warning!("Failed to add tracks to playlist: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
