use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    api::session::{SpotifySession, respond},
    error::AppError,
    server::AppState,
    shuffle,
    spotify::SpotifyClient,
    success,
    types::{Playlist, PlaylistView, ShuffleParams},
    utils,
};

/// Keeps the playlists owned by `user_id`, in the order Spotify listed them.
pub fn owned_playlist_views(user_id: &str, playlists: Vec<Playlist>) -> Vec<PlaylistView> {
    playlists
        .into_iter()
        .filter(|playlist| playlist.owner.id == user_id)
        .map(|playlist| PlaylistView {
            shuffle_tracks_link: utils::shuffle_link(&playlist.id),
            name: playlist.name,
            tracks_total: playlist.tracks.total,
        })
        .collect()
}

pub async fn list_playlists(
    State(state): State<Arc<AppState>>,
    SpotifySession(mut client): SpotifySession,
    jar: CookieJar,
) -> Response {
    let outcome = load_owned_playlists(&mut client).await.map(Json);
    respond(jar, &client, state.config.secure_cookies, outcome)
}

async fn load_owned_playlists(
    client: &mut SpotifyClient,
) -> Result<Vec<PlaylistView>, AppError> {
    let user = client
        .current_user()
        .await
        .map_err(AppError::upstream("Failed to get current user"))?;

    let playlists = client
        .current_user_playlists()
        .await
        .map_err(AppError::upstream("Failed to get playlists"))?;

    Ok(owned_playlist_views(&user.id, playlists))
}

pub async fn shuffle_playlist(
    State(state): State<Arc<AppState>>,
    SpotifySession(mut client): SpotifySession,
    jar: CookieJar,
    Query(params): Query<ShuffleParams>,
) -> Result<Response, AppError> {
    let playlist_id = params
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing playlist id".into()))?;

    let outcome = shuffle::shuffle_playlist(&mut client, &playlist_id)
        .await
        .map(|written| {
            success!("Shuffled playlist {} ({} tracks)", playlist_id, written);
            StatusCode::OK
        });

    Ok(respond(jar, &client, state.config.secure_cookies, outcome))
}
