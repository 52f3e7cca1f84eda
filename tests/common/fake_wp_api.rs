//! Fake WordPress REST API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1 and serves `GET /wp-json/wp/v2/{route}?search=..&per_page=..`
//! from records registered by the test. Matching is a case-insensitive
//! substring test on the record's label (`title.rendered` or `name`), which
//! is close enough to WordPress's own search for these harnesses.
//!
//! Per route the test can force a status code or a raw body, and per search
//! term it can add a delay so responses resolve out of order. Every request
//! is logged.
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeWpApi::start().await.unwrap();
//! api.add_records("posts", vec![post(1, "Hello world")]).await;
//! // Point a RestSource at api.base_url()
//! ```

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request as the server saw it, with query parameters decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub route: String,
    pub search: String,
    pub per_page: Option<u32>,
}

#[derive(Default)]
struct ApiState {
    records: HashMap<String, Vec<Value>>,
    statuses: HashMap<String, u16>,
    raw_bodies: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    log: Vec<RecordedRequest>,
}

/// Handle to the running fake API server.
pub struct FakeWpApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeWpApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/wp-json/wp/v2/{route}", get(search))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Site root (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn add_records(&self, route: &str, records: Vec<Value>) {
        let mut state = self.state.lock().await;
        state
            .records
            .entry(route.to_string())
            .or_default()
            .extend(records);
    }

    /// Answer every request on `route` with `status` and an empty array.
    pub async fn fail_with(&self, route: &str, status: u16) {
        self.state
            .lock()
            .await
            .statuses
            .insert(route.to_string(), status);
    }

    /// Answer every request on `route` with `body` verbatim.
    pub async fn respond_raw(&self, route: &str, body: &str) {
        self.state
            .lock()
            .await
            .raw_bodies
            .insert(route.to_string(), body.to_string());
    }

    /// Hold responses for `search` back by `delay`.
    pub async fn delay_search(&self, search: &str, delay: Duration) {
        self.state
            .lock()
            .await
            .delays
            .insert(search.to_string(), delay);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.log.clone()
    }

    /// Search terms of every logged request, in arrival order.
    pub async fn searches(&self) -> Vec<String> {
        self.requests().await.into_iter().map(|r| r.search).collect()
    }
}

// ---------------------------------------------------------------------------
// Route handler
// ---------------------------------------------------------------------------

async fn search(
    Path(route): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> Response {
    let search = params.get("search").cloned().unwrap_or_default();
    let per_page = params.get("per_page").and_then(|p| p.parse().ok());

    let (delay, status, raw, matches) = {
        let mut state = state.lock().await;
        state.log.push(RecordedRequest {
            route: route.clone(),
            search: search.clone(),
            per_page,
        });
        let needle = search.to_lowercase();
        let matches: Vec<Value> = state
            .records
            .get(&route)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| label(r).to_lowercase().contains(&needle))
                    .take(per_page.unwrap_or(10) as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        (
            state.delays.get(&search).copied(),
            state.statuses.get(&route).copied(),
            state.raw_bodies.get(&route).cloned(),
            matches,
        )
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if let Some(code) = status {
        let code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, axum::Json(Vec::<Value>::new())).into_response();
    }
    if let Some(body) = raw {
        return (StatusCode::OK, body).into_response();
    }
    axum::Json(matches).into_response()
}

fn label(record: &Value) -> &str {
    record
        .pointer("/title/rendered")
        .or_else(|| record.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
}
