//! Cookie based session storage.
//!
//! The server keeps no session table. The OAuth token travels in the
//! `spotify_token` cookie as base64 encoded JSON, and the anti-forgery state
//! of a pending authorization lives in `spotify_auth_state`. Confidentiality
//! of the token therefore rests on the HTTP-only flag, the optional `Secure`
//! flag and transport encryption.

use std::fmt;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::STANDARD};
use time::{Duration, OffsetDateTime};

use crate::types::Token;

pub const TOKEN_COOKIE: &str = "spotify_token";
pub const STATE_COOKIE: &str = "spotify_auth_state";

/// Lifetime of the state cookie; an authorization attempt must finish within it.
pub const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

#[derive(Debug)]
pub enum SessionError {
    Missing,
    Base64(base64::DecodeError),
    Json(serde_json::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Missing => write!(f, "session cookie not found"),
            SessionError::Base64(e) => write!(f, "session cookie is not valid base64: {}", e),
            SessionError::Json(e) => write!(f, "session cookie holds a malformed token: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<base64::DecodeError> for SessionError {
    fn from(err: base64::DecodeError) -> Self {
        SessionError::Base64(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Json(err)
    }
}

/// Serializes a token into a cookie-safe string.
pub fn encode(token: &Token) -> Result<String, SessionError> {
    let json = serde_json::to_vec(token)?;
    Ok(STANDARD.encode(json))
}

/// Inverse of [`encode`].
pub fn decode(value: &str) -> Result<Token, SessionError> {
    let json = STANDARD.decode(value.trim())?;
    Ok(serde_json::from_slice(&json)?)
}

/// Reads and decodes the token cookie from the request jar.
pub fn token_from_jar(jar: &CookieJar) -> Result<Token, SessionError> {
    let cookie = jar.get(TOKEN_COOKIE).ok_or(SessionError::Missing)?;
    decode(cookie.value())
}

pub fn state_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE).map(|c| c.value().to_string())
}

/// Builds the HTTP-only session cookie; it expires together with the token.
pub fn token_cookie(token: &Token, secure: bool) -> Result<Cookie<'static>, SessionError> {
    let value = encode(token)?;
    let mut builder = Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);

    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(token.expiry.timestamp()) {
        builder = builder.expires(expires);
    }

    Ok(builder.build())
}

pub fn state_cookie(state: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(STATE_COOKIE_MAX_AGE_SECS))
        .build()
}

/// Overwrites the session cookie with an empty, already expired value.
pub fn expired_token_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

pub fn expired_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, ""))
        .path("/")
        .http_only(true)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}
