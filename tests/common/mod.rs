//! In-process mock of the sentiment API
//!
//! Serves the REST endpoints under `/api` and a scripted WebSocket stream at
//! `/ws/sentiment` on an ephemeral local port.

#![allow(dead_code)]

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        RawQuery, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use sentiview::Config;

/// How the mock behaves
#[derive(Default)]
pub struct MockBehavior {
    /// Paths (e.g. `/posts`) answered with 500
    pub failing: HashSet<&'static str>,
    /// Paths answered with 200 and a non-JSON body
    pub garbage: HashSet<&'static str>,
    /// Text frames sent to every stream connection
    pub frames: Vec<String>,
    /// Hold the frames until [`MockApi::release_frames`] is called
    pub gated: bool,
    /// Close each stream connection after its frames
    pub close_after_frames: bool,
}

struct MockState {
    behavior: MockBehavior,
    gate: Notify,
    queries: Mutex<Vec<(String, String)>>,
    connections: AtomicUsize,
    client_closes: AtomicUsize,
}

pub struct MockApi {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start(behavior: MockBehavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            gate: Notify::new(),
            queries: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
            client_closes: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/sentiment/distribution", get(distribution))
            .route("/api/sentiment/aggregate", get(aggregate))
            .route("/api/posts", get(posts))
            .route("/api/health", get(health))
            .route("/ws/sentiment", get(ws_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Config pointing at this mock; the stream URL is derived from the base URL
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.api.base_url = format!("http://{}/api", self.addr);
        config.api.request_timeout_secs = 5;
        config
    }

    pub fn release_frames(&self) {
        self.state.gate.notify_one();
    }

    /// Raw query strings received per path
    pub fn queries(&self) -> Vec<(String, String)> {
        self.state.queries.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub fn client_closes(&self) -> usize {
        self.state.client_closes.load(Ordering::SeqCst)
    }

    /// Poll `check` until it holds or two seconds pass
    pub async fn eventually(&self, mut check: impl FnMut(&Self) -> bool) -> bool {
        for _ in 0..200 {
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

fn scripted(state: &MockState, path: &str, query: Option<String>, body: Value) -> Response {
    state
        .queries
        .lock()
        .unwrap()
        .push((path.to_string(), query.unwrap_or_default()));

    if state.behavior.failing.contains(path) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    if state.behavior.garbage.contains(path) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    Json(body).into_response()
}

async fn distribution(State(state): State<Arc<MockState>>, RawQuery(q): RawQuery) -> Response {
    scripted(
        &state,
        "/sentiment/distribution",
        q,
        json!({
            "distribution": { "positive": 3, "negative": 1, "neutral": 0 },
            "total": 4,
            "time_range_hours": 24
        }),
    )
}

async fn aggregate(State(state): State<Arc<MockState>>, RawQuery(q): RawQuery) -> Response {
    scripted(
        &state,
        "/sentiment/aggregate",
        q,
        json!({
            "data": [
                { "timestamp": "2024-03-01T10:00:00", "positive": 1, "negative": 0, "neutral": 0 },
                { "timestamp": null, "positive": 9, "negative": 9, "neutral": 9 },
                { "timestamp": "2024-03-01T11:00:00Z", "positive": 2, "negative": 1 }
            ]
        }),
    )
}

async fn posts(State(state): State<Arc<MockState>>, RawQuery(q): RawQuery) -> Response {
    scripted(
        &state,
        "/posts",
        q,
        json!({
            "posts": [
                {
                    "post_id": "a",
                    "content": "Loving the new release",
                    "source": "twitter",
                    "author": "jdoe",
                    "created_at": "2024-03-01T09:58:00",
                    "sentiment": { "label": "positive", "confidence": 0.97, "emotion": "joy" }
                },
                {
                    "post_id": 17,
                    "content": "Meh",
                    "source": "reddit",
                    "sentiment": { "label": "neutral" }
                }
            ],
            "total": 2,
            "limit": 5,
            "offset": 0
        }),
    )
}

async fn health(State(state): State<Arc<MockState>>) -> Response {
    scripted(
        &state,
        "/health",
        None,
        json!({
            "status": "healthy",
            "timestamp": "2024-03-01T10:00:00",
            "services": { "database": "connected", "redis": "connected" },
            "stats": { "posts_last_hour": 42 }
        }),
    )
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>) -> Response {
    ws.on_upgrade(move |socket| serve_stream(socket, state))
}

async fn serve_stream(mut socket: WebSocket, state: Arc<MockState>) {
    state.connections.fetch_add(1, Ordering::SeqCst);

    if state.behavior.gated {
        state.gate.notified().await;
    }

    for frame in &state.behavior.frames {
        if socket.send(Message::Text(frame.clone())).await.is_err() {
            return;
        }
    }

    if state.behavior.close_after_frames {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        if let Message::Close(_) = msg {
            break;
        }
    }
    state.client_closes.fetch_add(1, Ordering::SeqCst);
}
