use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::Rng;

pub const STATE_BYTES: usize = 16;

/// Generates a fresh anti-forgery state for one authorization attempt.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE.encode(bytes)
}

pub fn shuffle_link(playlist_id: &str) -> String {
    format!("/shuffle?id={}", playlist_id)
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}
