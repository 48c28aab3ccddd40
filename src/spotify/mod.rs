//! # Spotify Integration Module
//!
//! Thin integration layer over the Spotify accounts service and Web API,
//! covering exactly what the shuffler needs.
//!
//! ## Core Modules
//!
//! - [`auth`] - OAuth 2.0 authorization-code flow: authorization URL,
//!   code-for-token exchange and token refresh, all with client credentials.
//! - [`client`] - A per-request Web API client bound to one user's token,
//!   refreshing it transparently when it expires.
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user identity
//! - `GET /me/playlists` - Playlists the user owns or follows
//! - `GET /playlists/{id}/tracks` - Playlist items, paginated
//! - `PUT /playlists/{id}/tracks` - Replace (here: clear) playlist items
//! - `POST /playlists/{id}/tracks` - Append up to 100 items
//! - `POST /api/token` - Token exchange and refresh
//!
//! ## Error Types
//!
//! - [`auth::AuthError`] - State mismatch, denied consent, failed exchange
//! - [`client::SpotifyError`] - Transport, status and refresh failures, plus
//!   the `NoMorePages` end-of-pagination signal

pub mod auth;
pub mod client;

pub use auth::{AuthError, Authenticator};
pub use client::{SpotifyClient, SpotifyError};
