//! Configuration management for the playlist shuffler.
//!
//! All configuration is read once at startup into an immutable [`Config`]
//! value which is then handed to the server and, through it, to every
//! request handler. Nothing reads the environment after startup.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Command line flags (only `--port`)
//! 2. Environment variables
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, fmt, io::ErrorKind};

pub const CLIENT_ID_VAR: &str = "SPOTIFY_SHUFFLER_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_SHUFFLER_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "SPOTIFY_SHUFFLER_REDIRECT_URI";
pub const SECURE_COOKIES_VAR: &str = "SPOTIFY_SHUFFLER_SECURE_COOKIES";
pub const PORT_VAR: &str = "PORT";
pub const API_URL_VAR: &str = "SPOTIFY_API_URL";
pub const AUTH_URL_VAR: &str = "SPOTIFY_API_AUTH_URL";
pub const TOKEN_URL_VAR: &str = "SPOTIFY_API_TOKEN_URL";

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "Missing {} environment variable", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub port: u16,
    /// Sets the `Secure` flag on every cookie the service writes.
    pub secure_cookies: bool,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the client id or client secret is
    /// unset or empty, and [`ConfigError::Invalid`] if `PORT` or the secure
    /// cookie flag cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id = get(CLIENT_ID_VAR).ok_or(ConfigError::Missing(CLIENT_ID_VAR))?;
        let client_secret =
            get(CLIENT_SECRET_VAR).ok_or(ConfigError::Missing(CLIENT_SECRET_VAR))?;

        let port = match get(PORT_VAR) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: PORT_VAR,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let secure_cookies = match get(SECURE_COOKIES_VAR) {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: SECURE_COOKIES_VAR,
                value,
            })?,
            None => false,
        };

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri: get(REDIRECT_URI_VAR).unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
            port,
            secure_cookies,
            api_url: trim_url(get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.into())),
            auth_url: get(AUTH_URL_VAR).unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
            token_url: get(TOKEN_URL_VAR).unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
        })
    }
}

/// Loads environment variables from a `.env` file in the working directory.
///
/// A missing file is not an error; variables already present in the process
/// environment are never overridden.
///
/// # Errors
///
/// Returns an error string if the file exists but cannot be read or parsed.
pub fn load_env() -> Result<(), String> {
    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
