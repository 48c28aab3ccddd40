use axum::{Router, routing::get};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};

use crate::{
    Res, api,
    config::Config,
    info,
    spotify::{Authenticator, SpotifyClient},
    types::Token,
};

/// Immutable state shared by every request.
pub struct AppState {
    pub config: Config,
    pub authenticator: Arc<Authenticator>,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let authenticator = Arc::new(Authenticator::new(&config, http.clone()));

        Ok(AppState {
            config,
            authenticator,
            http,
        })
    }

    /// Binds a Web API client to the token of the current request.
    pub fn client_for(&self, token: Token) -> SpotifyClient {
        SpotifyClient::new(
            self.http.clone(),
            self.config.api_url.clone(),
            Arc::clone(&self.authenticator),
            token,
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/auth", get(api::redirect_to_spotify))
        .route("/callback", get(api::callback))
        .route("/list", get(api::list_playlists))
        .route("/shuffle", get(api::shuffle_playlist))
        .route("/logout", get(api::logout))
        .with_state(state)
}

pub async fn start_api_server(config: Config) -> Res<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
