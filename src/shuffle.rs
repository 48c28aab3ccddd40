//! Fetch, permute and rewrite a playlist.
//!
//! The routine runs in three phases: read every page of items, shuffle the
//! track ids, then clear the playlist and append the ids back in batches of
//! [`MAX_TRACKS_PER_REQUEST`]. Nothing is rolled back if a later batch fails;
//! the playlist is then left empty or partially filled.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    error::AppError,
    info,
    spotify::{SpotifyClient, SpotifyError, client::MAX_TRACKS_PER_REQUEST},
    types::PlaylistItem,
};

/// Collects the ids of the tracks that can be re-added by id.
///
/// Items without a track (removed tracks) and local files, which have no
/// id, are skipped.
pub fn track_ids(items: &[PlaylistItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.track.as_ref())
        .filter(|track| !track.is_local)
        .filter_map(|track| track.id.clone())
        .collect()
}

/// Shuffles with a generator seeded from the wall clock.
pub fn shuffle(ids: &mut [String]) {
    shuffle_with(ids, &mut StdRng::seed_from_u64(time_seed()));
}

/// Uniform Fisher-Yates permutation driven by the given generator.
pub fn shuffle_with<R: Rng + ?Sized>(ids: &mut [String], rng: &mut R) {
    ids.shuffle(rng);
}

/// Splits ids into the consecutive batches sent to the append endpoint.
pub fn batches(ids: &[String]) -> std::slice::Chunks<'_, String> {
    ids.chunks(MAX_TRACKS_PER_REQUEST)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Reads every item of a playlist, following pages until the last one.
///
/// Items gathered so far are dropped on failure.
pub async fn fetch_all_items(
    client: &mut SpotifyClient,
    playlist_id: &str,
) -> Result<Vec<PlaylistItem>, AppError> {
    let mut page = client
        .playlist_items(playlist_id)
        .await
        .map_err(AppError::upstream("Failed to get playlist tracks"))?;

    let mut items = Vec::new();
    loop {
        items.append(&mut page.items);
        page = match client.next_page(&page).await {
            Ok(next) => next,
            Err(SpotifyError::NoMorePages) => break,
            Err(e) => {
                return Err(AppError::upstream(
                    "Failed to get next page of playlist items",
                )(e));
            }
        };
    }

    Ok(items)
}

/// Empties the playlist and appends the ids back in order.
pub async fn replace_tracks(
    client: &mut SpotifyClient,
    playlist_id: &str,
    ids: &[String],
) -> Result<(), AppError> {
    client
        .clear_playlist(playlist_id)
        .await
        .map_err(AppError::upstream("Failed to replace playlist tracks"))?;

    for batch in batches(ids) {
        client
            .add_tracks(playlist_id, batch)
            .await
            .map_err(AppError::upstream("Failed to add tracks to playlist"))?;
    }

    Ok(())
}

/// Shuffles one playlist end to end and returns the number of tracks written back.
pub async fn shuffle_playlist(
    client: &mut SpotifyClient,
    playlist_id: &str,
) -> Result<usize, AppError> {
    let items = fetch_all_items(client, playlist_id).await?;
    let mut ids = track_ids(&items);
    info!(
        "Got {} items for playlist {}, {} can be shuffled",
        items.len(),
        playlist_id,
        ids.len()
    );

    shuffle(&mut ids);
    replace_tracks(client, playlist_id, &ids).await?;

    Ok(ids.len())
}
