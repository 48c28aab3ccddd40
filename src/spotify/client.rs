use std::{fmt, sync::Arc};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    spotify::auth::{AuthError, Authenticator},
    types::{Page, Playlist, PlaylistItem, SnapshotResponse, Token, TracksRequest, User},
    utils, warning,
};

/// Maximum number of items Spotify accepts per add-tracks call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;
pub const PLAYLIST_ITEMS_PAGE_LIMIT: u32 = 100;
pub const PLAYLISTS_PAGE_LIMIT: u32 = 50;

#[derive(Debug)]
pub enum SpotifyError {
    Http(reqwest::Error),
    Status(StatusCode, String),
    Auth(AuthError),
    Url(url::ParseError),
    /// End of a paginated collection. Not a failure.
    NoMorePages,
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Http(e) => write!(f, "request to Spotify failed: {}", e),
            SpotifyError::Status(status, body) => {
                write!(f, "Spotify answered {}: {}", status, body)
            }
            SpotifyError::Auth(e) => write!(f, "token refresh failed: {}", e),
            SpotifyError::Url(e) => write!(f, "invalid Spotify URL: {}", e),
            SpotifyError::NoMorePages => write!(f, "no more pages"),
        }
    }
}

impl std::error::Error for SpotifyError {}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Http(err)
    }
}

impl From<AuthError> for SpotifyError {
    fn from(err: AuthError) -> Self {
        SpotifyError::Auth(err)
    }
}

impl From<url::ParseError> for SpotifyError {
    fn from(err: url::ParseError) -> Self {
        SpotifyError::Url(err)
    }
}

/// Web API client bound to one user's token.
///
/// The access token is refreshed before a request when it is about to
/// expire, and once more if Spotify rejects it with 401. A client lives for
/// the duration of a single request.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    authenticator: Arc<Authenticator>,
    token: Token,
    refreshed: bool,
}

impl SpotifyClient {
    pub fn new(
        http: Client,
        api_url: impl Into<String>,
        authenticator: Arc<Authenticator>,
        token: Token,
    ) -> Self {
        SpotifyClient {
            http,
            api_url: api_url.into(),
            authenticator,
            token,
            refreshed: false,
        }
    }

    /// The new token if a refresh happened while serving this request.
    pub fn refreshed_token(&self) -> Option<&Token> {
        self.refreshed.then_some(&self.token)
    }

    pub async fn current_user(&mut self) -> Result<User, SpotifyError> {
        let url = self.endpoint(&["me"])?;
        self.get_json(url).await
    }

    /// Every playlist the user owns or follows, across all pages.
    pub async fn current_user_playlists(&mut self) -> Result<Vec<Playlist>, SpotifyError> {
        let mut url = self.endpoint(&["me", "playlists"])?;
        url.query_pairs_mut()
            .append_pair("limit", &PLAYLISTS_PAGE_LIMIT.to_string());

        let mut page: Page<Playlist> = self.get_json(url).await?;
        let mut playlists = Vec::new();
        loop {
            playlists.append(&mut page.items);
            page = match self.next_page(&page).await {
                Ok(next) => next,
                Err(SpotifyError::NoMorePages) => break,
                Err(e) => return Err(e),
            };
        }

        Ok(playlists)
    }

    /// First page of a playlist's items.
    pub async fn playlist_items(
        &mut self,
        playlist_id: &str,
    ) -> Result<Page<PlaylistItem>, SpotifyError> {
        let mut url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        url.query_pairs_mut()
            .append_pair("limit", &PLAYLIST_ITEMS_PAGE_LIMIT.to_string());
        self.get_json(url).await
    }

    /// Follows the `next` link of a page.
    ///
    /// Returns [`SpotifyError::NoMorePages`] once the last page was reached.
    pub async fn next_page<T: DeserializeOwned>(
        &mut self,
        page: &Page<T>,
    ) -> Result<Page<T>, SpotifyError> {
        let next = page.next.as_deref().ok_or(SpotifyError::NoMorePages)?;
        let url = Url::parse(next)?;
        self.get_json(url).await
    }

    /// Removes every track from a playlist.
    pub async fn clear_playlist(&mut self, playlist_id: &str) -> Result<(), SpotifyError> {
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        let body = TracksRequest { uris: Vec::new() };
        self.send(|http| http.put(url.clone()).json(&body)).await?;
        Ok(())
    }

    /// Appends tracks to the end of a playlist, in the given order.
    ///
    /// At most [`MAX_TRACKS_PER_REQUEST`] ids are accepted per call.
    pub async fn add_tracks(
        &mut self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<SnapshotResponse, SpotifyError> {
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        let body = TracksRequest {
            uris: track_ids.iter().map(|id| utils::track_uri(id)).collect(),
        };
        let response = self.send(|http| http.post(url.clone()).json(&body)).await?;
        Ok(response.json::<SnapshotResponse>().await?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SpotifyError> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| SpotifyError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&mut self, url: Url) -> Result<T, SpotifyError> {
        let response = self.send(|http| http.get(url.clone())).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send<F>(&mut self, build: F) -> Result<Response, SpotifyError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        if self.token.is_expired() {
            self.refresh().await?;
        }

        let response = build(&self.http)
            .bearer_auth(&self.token.access_token)
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        warning!("Spotify rejected the access token, refreshing");
        self.refresh().await?;
        let response = build(&self.http)
            .bearer_auth(&self.token.access_token)
            .send()
            .await?;
        check_status(response).await
    }

    async fn refresh(&mut self) -> Result<(), SpotifyError> {
        self.token = self.authenticator.refresh(&self.token).await?;
        self.refreshed = true;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SpotifyError::Status(status, body))
}
