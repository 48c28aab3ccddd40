//! # API Module
//!
//! HTTP handlers of the shuffler. Every handler is stateless: the only
//! per-user data is the token cookie, and the only shared value is the
//! immutable [`crate::server::AppState`].
//!
//! ## Endpoints
//!
//! - [`index`] - `GET /` landing page
//! - [`health`] - `GET /health` status and version
//! - [`redirect_to_spotify`] - `GET /auth`, 303 to the Spotify consent page
//! - [`callback`] - `GET /callback`, completes the authorization-code flow
//! - [`list_playlists`] - `GET /list`, owned playlists as JSON
//! - [`shuffle_playlist`] - `GET /shuffle?id=`, shuffles one playlist
//! - [`logout`] - `GET /logout`, clears the session cookie
//!
//! ## Errors
//!
//! Handlers return [`crate::error::AppError`], which renders as 400, 401, 403
//! or 500. A failing request never affects the others.

mod auth;
mod health;
mod index;
mod playlists;
mod session;

pub use auth::{callback, logout, redirect_to_spotify};
pub use health::health;
pub use index::index;
pub use playlists::{list_playlists, owned_playlist_views, shuffle_playlist};
pub use session::{SpotifySession, respond, store_refreshed_token};
