use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::AppError,
    server::AppState,
    session,
    spotify::SpotifyClient,
};

/// Web API client for the user behind the request's session cookie.
///
/// Rejects with 401 before any call to Spotify when the cookie is missing or
/// cannot be decoded.
pub struct SpotifySession(pub SpotifyClient);

impl FromRequestParts<Arc<AppState>> for SpotifySession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session::token_from_jar(&jar).map_err(|_| AppError::Unauthenticated)?;
        Ok(SpotifySession(state.client_for(token)))
    }
}

/// Writes a refreshed token back to the browser, if the client refreshed one.
pub fn store_refreshed_token(
    jar: CookieJar,
    client: &SpotifyClient,
    secure: bool,
) -> Result<CookieJar, AppError> {
    match client.refreshed_token() {
        Some(token) => Ok(jar.add(session::token_cookie(token, secure)?)),
        None => Ok(jar),
    }
}

/// Renders a handler outcome, carrying a refreshed token on success and on
/// failure alike so the next request does not refresh again.
pub fn respond<T: IntoResponse>(
    jar: CookieJar,
    client: &SpotifyClient,
    secure: bool,
    outcome: Result<T, AppError>,
) -> Response {
    let jar = match store_refreshed_token(jar, client, secure) {
        Ok(jar) => jar,
        Err(e) => return e.into_response(),
    };

    match outcome {
        Ok(body) => (jar, body).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}
