#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Form, Json, Router,
    body::{Body, to_bytes},
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use playlist_shuffler::{
    config::Config,
    server::{self, AppState},
    session,
    types::{Token, TracksRequest},
};

pub const USER_ID: &str = "me-user";
pub const FRESH_ACCESS: &str = "fresh-access";
pub const REVOKED_ACCESS: &str = "revoked-access";

/// Everything the mock Spotify saw.
#[derive(Debug, Default)]
pub struct Recorded {
    pub calls: Vec<String>,
    pub grants: Vec<String>,
    pub added: Vec<Vec<String>>,
}

#[derive(Clone)]
struct MockState {
    base: String,
    log: Arc<Mutex<Recorded>>,
    playlists: Vec<Value>,
    items: Vec<Value>,
    fail_add_batch: Option<usize>,
    reject_grants: bool,
    issued_access: String,
    reported_total: Option<u32>,
}

pub struct MockSpotify {
    pub base: String,
    pub log: Arc<Mutex<Recorded>>,
}

impl MockSpotify {
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn grants(&self) -> Vec<String> {
        self.log.lock().unwrap().grants.clone()
    }

    pub fn added(&self) -> Vec<Vec<String>> {
        self.log.lock().unwrap().added.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[derive(Default)]
pub struct MockBuilder {
    playlists: Vec<Value>,
    items: Vec<Value>,
    fail_add_batch: Option<usize>,
    reject_grants: bool,
    issued_access: Option<String>,
    reported_total: Option<u32>,
}

impl MockBuilder {
    pub fn playlists(mut self, playlists: Vec<Value>) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn items(mut self, items: Vec<Value>) -> Self {
        self.items = items;
        self
    }

    /// Makes the n-th (zero based) add-tracks call fail with 500.
    pub fn fail_add_batch(mut self, n: usize) -> Self {
        self.fail_add_batch = Some(n);
        self
    }

    /// Answers every token request with 400 `invalid_grant`.
    pub fn reject_grants(mut self) -> Self {
        self.reject_grants = true;
        self
    }

    /// Access token handed out by the token endpoint.
    pub fn issued_access(mut self, access: &str) -> Self {
        self.issued_access = Some(access.to_string());
        self
    }

    /// Overrides the `total` field of playlist item pages.
    pub fn reported_total(mut self, total: u32) -> Self {
        self.reported_total = Some(total);
        self
    }

    pub async fn start(self) -> MockSpotify {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let log = Arc::new(Mutex::new(Recorded::default()));

        let state = MockState {
            base: base.clone(),
            log: Arc::clone(&log),
            playlists: self.playlists,
            items: self.items,
            fail_add_batch: self.fail_add_batch,
            reject_grants: self.reject_grants,
            issued_access: self
                .issued_access
                .unwrap_or_else(|| FRESH_ACCESS.to_string()),
            reported_total: self.reported_total,
        };

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/playlists", get(playlists))
            .route(
                "/v1/playlists/{id}/tracks",
                get(items).put(replace).post(add),
            )
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockSpotify { base, log }
    }
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

fn rejected(state: &MockState, headers: &HeaderMap, call: String) -> Option<Response> {
    let token = bearer(headers);
    state
        .log
        .lock()
        .unwrap()
        .calls
        .push(format!("{} token={}", call, token));
    (token == REVOKED_ACCESS || token.is_empty())
        .then(|| StatusCode::UNAUTHORIZED.into_response())
}

async fn token(
    State(state): State<MockState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let grant = form.get("grant_type").cloned().unwrap_or_default();
    {
        let mut log = state.log.lock().unwrap();
        log.calls.push(format!("POST /api/token {}", grant));
        log.grants.push(grant);
    }

    if state.reject_grants {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Refresh token revoked" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": state.issued_access,
        "token_type": "Bearer",
        "expires_in": 3600,
        "refresh_token": "fresh-refresh",
        "scope": "playlist-read-private playlist-modify-private playlist-modify-public"
    }))
    .into_response()
}

async fn me(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Some(rejection) = rejected(&state, &headers, "GET /me".into()) {
        return rejection;
    }
    Json(json!({ "id": USER_ID, "display_name": "Me" })).into_response()
}

async fn playlists(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Some(rejection) = rejected(&state, &headers, "GET /me/playlists".into()) {
        return rejection;
    }
    let total = state
        .reported_total
        .map(|total| total as usize)
        .unwrap_or(state.playlists.len());

    Json(json!({
        "items": state.playlists,
        "next": null,
        "total": total
    }))
    .into_response()
}

async fn items(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let offset: usize = query
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let limit: usize = query
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(100);

    let call = format!("GET /playlists/{}/tracks offset={}", id, offset);
    if let Some(rejection) = rejected(&state, &headers, call) {
        return rejection;
    }

    let end = (offset + limit).min(state.items.len());
    let page: Vec<Value> = state.items[offset.min(end)..end].to_vec();
    let next = (end < state.items.len()).then(|| {
        format!(
            "{}/v1/playlists/{}/tracks?offset={}&limit={}",
            state.base, id, end, limit
        )
    });

    let total = state
        .reported_total
        .map(|total| total as usize)
        .unwrap_or(state.items.len());

    Json(json!({
        "items": page,
        "next": next,
        "total": total
    }))
    .into_response()
}

async fn replace(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TracksRequest>,
) -> Response {
    let call = format!("PUT /playlists/{}/tracks uris={}", id, body.uris.len());
    if let Some(rejection) = rejected(&state, &headers, call) {
        return rejection;
    }
    Json(json!({ "snapshot_id": "cleared" })).into_response()
}

async fn add(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TracksRequest>,
) -> Response {
    let call = format!("POST /playlists/{}/tracks uris={}", id, body.uris.len());
    if let Some(rejection) = rejected(&state, &headers, call) {
        return rejection;
    }

    let batch = {
        let mut log = state.log.lock().unwrap();
        log.added.push(body.uris.clone());
        log.added.len() - 1
    };

    if state.fail_add_batch == Some(batch) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({ "snapshot_id": format!("snap-{}", batch) })).into_response()
}

pub fn track_item(id: &str) -> Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "id": id,
            "name": format!("Track {}", id),
            "uri": format!("spotify:track:{}", id),
            "is_local": false
        }
    })
}

pub fn removed_item() -> Value {
    json!({ "added_at": "2024-01-01T00:00:00Z", "track": null })
}

pub fn local_item() -> Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "id": null,
            "name": "Home recording",
            "uri": "spotify:local:artist:album:home+recording:180",
            "is_local": true
        }
    })
}

pub fn playlist(id: &str, name: &str, owner: &str, total: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "owner": { "id": owner, "display_name": owner },
        "tracks": { "total": total }
    })
}

pub fn test_config(base: &str) -> Config {
    Config {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        redirect_uri: "http://127.0.0.1:8080/callback".into(),
        port: 0,
        secure_cookies: false,
        api_url: format!("{}/v1", base),
        auth_url: format!("{}/authorize", base),
        token_url: format!("{}/api/token", base),
    }
}

pub fn app(base: &str) -> Router {
    let state = AppState::new(test_config(base)).unwrap();
    server::router(Arc::new(state))
}

pub fn valid_token() -> Token {
    Token {
        access_token: "access".into(),
        token_type: "Bearer".into(),
        refresh_token: "refresh".into(),
        expiry: Utc::now() + Duration::hours(1),
    }
}

pub fn token_cookie_header(token: &Token) -> String {
    format!("{}={}", session::TOKEN_COOKIE, session::encode(token).unwrap())
}

pub async fn fetch(app: Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Raw `Set-Cookie` header for the given cookie name, if any.
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .map(|v| v.to_string())
}
