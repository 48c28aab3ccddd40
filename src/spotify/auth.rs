use std::fmt;

use chrono::{Duration, Utc};
use reqwest::Client;
use url::{ParseError, Url};

use crate::{
    config::Config,
    types::{CallbackParams, Token, TokenResponse},
};

pub const SCOPE_PLAYLIST_READ_PRIVATE: &str = "playlist-read-private";
pub const SCOPE_PLAYLIST_MODIFY_PRIVATE: &str = "playlist-modify-private";
pub const SCOPE_PLAYLIST_MODIFY_PUBLIC: &str = "playlist-modify-public";

pub const SCOPES: [&str; 3] = [
    SCOPE_PLAYLIST_READ_PRIVATE,
    SCOPE_PLAYLIST_MODIFY_PRIVATE,
    SCOPE_PLAYLIST_MODIFY_PUBLIC,
];

#[derive(Debug)]
pub enum AuthError {
    StateMismatch,
    Denied(String),
    MissingCode,
    Exchange(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::StateMismatch => write!(f, "State mismatch or cookie not found"),
            AuthError::Denied(reason) => write!(f, "Authorization denied: {}", reason),
            AuthError::MissingCode => write!(f, "Missing authorization code"),
            AuthError::Exchange(reason) => write!(f, "Token exchange failed: {}", reason),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Exchange(err.to_string())
    }
}

/// OAuth client configuration for the Spotify accounts service.
///
/// Built once at startup and shared read-only by all requests.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    http: Client,
}

impl Authenticator {
    pub fn new(config: &Config, http: Client) -> Self {
        Authenticator {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            http,
        }
    }

    /// Builds the URL the browser is sent to for granting access.
    ///
    /// # Errors
    ///
    /// Fails only if the configured authorization endpoint is not a valid URL.
    pub fn authorization_url(&self, state: &str) -> Result<Url, ParseError> {
        let scope = SCOPES.join(" ");
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
    }

    /// Validates the callback against the issued state and trades the code for a token.
    ///
    /// `expected_state` is the nonce read back from the state cookie. The
    /// state check happens before any request leaves the process, so a forged
    /// callback never reaches the token endpoint.
    pub async fn exchange_code(
        &self,
        expected_state: Option<&str>,
        params: &CallbackParams,
    ) -> Result<Token, AuthError> {
        match (expected_state, params.state.as_deref()) {
            (Some(expected), Some(received)) if !expected.is_empty() && expected == received => {}
            _ => return Err(AuthError::StateMismatch),
        }

        if let Some(reason) = &params.error {
            return Err(AuthError::Denied(reason.clone()));
        }

        let code = params.code.as_deref().ok_or(AuthError::MissingCode)?;

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<TokenResponse>().await?;
        let refresh_token = body
            .refresh_token
            .clone()
            .ok_or_else(|| AuthError::Exchange("response carries no refresh token".into()))?;

        Ok(token_from_response(body, refresh_token))
    }

    /// Obtains a fresh access token for an expired one.
    ///
    /// Spotify may omit the refresh token in the response, in which case the
    /// previous one stays valid and is carried over.
    pub async fn refresh(&self, token: &Token) -> Result<Token, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", token.refresh_token.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<TokenResponse>().await?;
        let refresh_token = body
            .refresh_token
            .clone()
            .unwrap_or_else(|| token.refresh_token.clone());

        Ok(token_from_response(body, refresh_token))
    }
}

fn token_from_response(body: TokenResponse, refresh_token: String) -> Token {
    Token {
        access_token: body.access_token,
        token_type: body.token_type,
        refresh_token,
        expiry: Utc::now() + Duration::seconds(body.expires_in),
    }
}
