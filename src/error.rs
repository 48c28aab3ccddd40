use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    session::SessionError,
    spotify::{AuthError, SpotifyError},
    warning,
};

/// Failure of a single request. Every variant maps to a status code and
/// ends only that request.
#[derive(Debug)]
pub enum AppError {
    Unauthenticated,
    BadRequest(String),
    Auth(AuthError),
    Upstream(String, SpotifyError),
    Serialization(SessionError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthenticated => write!(f, "unauthenticated"),
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Upstream(context, e) => write!(f, "{}: {}", context, e),
            AppError::Serialization(e) => write!(f, "failed to serialize token: {}", e),
            AppError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Serialization(err)
    }
}

impl AppError {
    /// Wraps an upstream failure with a short description of the step that failed.
    ///
    /// A token that cannot be refreshed, or that Spotify still rejects after a
    /// refresh, ends the session instead: the user has to log in again.
    pub fn upstream(context: impl Into<String>) -> impl FnOnce(SpotifyError) -> AppError {
        let context = context.into();
        move |err| match err {
            SpotifyError::Auth(_) => {
                warning!("{}: {}", context, err);
                AppError::Unauthenticated
            }
            SpotifyError::Status(status, _) if status == StatusCode::UNAUTHORIZED => {
                warning!("{}: {}", context, err);
                AppError::Unauthenticated
            }
            err => AppError::Upstream(context, err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::FORBIDDEN,
            AppError::Upstream(_, _) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !matches!(self, AppError::Unauthenticated) {
            warning!("{}", self);
        }

        match self {
            AppError::Unauthenticated => status.into_response(),
            AppError::Upstream(context, _) => (status, format!("{}.", context)).into_response(),
            AppError::Auth(AuthError::Exchange(_)) => {
                (status, "Failed to authenticate").into_response()
            }
            AppError::Serialization(_) => (status, "Failed to serialize token").into_response(),
            other => (status, other.to_string()).into_response(),
        }
    }
}
