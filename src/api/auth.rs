use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::AppError,
    server::AppState,
    session, success,
    types::CallbackParams,
    utils,
};

/// Starts the authorization flow with a fresh anti-forgery state.
pub async fn redirect_to_spotify(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let nonce = utils::generate_state();
    let url = state
        .authenticator
        .authorization_url(&nonce)
        .map_err(|e| AppError::Internal(format!("invalid authorization URL: {}", e)))?;

    let jar = jar.add(session::state_cookie(nonce, state.config.secure_cookies));
    Ok((jar, Redirect::to(url.as_str())))
}

/// Completes authentication redirected from Spotify.
///
/// The state cookie is consumed whatever the outcome. A failed exchange
/// answers 403 for this request only.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    let expected = session::state_from_jar(&jar);
    let jar = jar.add(session::expired_state_cookie());

    let token = match state
        .authenticator
        .exchange_code(expected.as_deref(), &params)
        .await
    {
        Ok(token) => token,
        Err(e) => return (jar, AppError::from(e)).into_response(),
    };

    let cookie = match session::token_cookie(&token, state.config.secure_cookies) {
        Ok(cookie) => cookie,
        Err(e) => return (jar, AppError::from(e)).into_response(),
    };

    success!("Token obtained, redirecting to list of playlists");
    (jar.add(cookie), Redirect::to("/")).into_response()
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.add(session::expired_token_cookie()), Redirect::to("/"))
}
