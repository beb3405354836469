//! Shared helpers: a stub retrieval service and recording collaborators.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use outline_bridge::models::{NotifyLevel, OutlineNode};
use outline_bridge::traits::{Notifier, OutlineProvider};
use serde_json::Value;
use std::sync::{Arc, Mutex};

// ─── Stub service ───────────────────────────────────────────────────

/// Canned reply: status plus body text.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Clone)]
struct StubState {
    ingest_reply: Reply,
    query_reply: Reply,
    ingests: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<Value>>>,
}

/// In-process stand-in for the retrieval service, bound to a free port.
pub struct StubService {
    pub base_url: String,
    ingests: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<Value>>>,
}

impl StubService {
    pub async fn start(ingest_reply: Reply, query_reply: Reply) -> Self {
        let state = StubState {
            ingest_reply,
            query_reply,
            ingests: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        };
        let ingests = state.ingests.clone();
        let queries = state.queries.clone();

        let app = Router::new()
            .route("/ingest", post(ingest_handler))
            .route("/query", post(query_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            ingests,
            queries,
        }
    }

    pub fn ingests(&self) -> Vec<Value> {
        self.ingests.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<Value> {
        self.queries.lock().unwrap().clone()
    }
}

fn respond(reply: &Reply) -> impl IntoResponse {
    let status = StatusCode::from_u16(reply.status).unwrap();
    let content_type = if serde_json::from_str::<Value>(&reply.body).is_ok() {
        "application/json"
    } else {
        "text/plain"
    };
    (
        status,
        [(header::CONTENT_TYPE, content_type)],
        reply.body.clone(),
    )
}

async fn ingest_handler(State(state): State<StubState>, body: String) -> impl IntoResponse {
    let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    state.ingests.lock().unwrap().push(value);
    respond(&state.ingest_reply)
}

async fn query_handler(State(state): State<StubState>, body: String) -> impl IntoResponse {
    let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    state.queries.lock().unwrap().push(value);
    respond(&state.query_reply)
}

/// A localhost URL nothing listens on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    format!("http://127.0.0.1:{}", port)
}

// ─── Collaborators ──────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, NotifyLevel)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, NotifyLevel)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, level: NotifyLevel) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), level));
    }
}

pub struct StaticProvider {
    pub name: Option<String>,
    pub blocks: Option<Vec<OutlineNode>>,
}

impl StaticProvider {
    pub fn page(name: &str, blocks: Vec<OutlineNode>) -> Self {
        Self {
            name: Some(name.to_string()),
            blocks: Some(blocks),
        }
    }
}

#[async_trait]
impl OutlineProvider for StaticProvider {
    async fn current_outline(&self) -> Result<Option<Vec<OutlineNode>>> {
        Ok(self.blocks.clone())
    }

    async fn current_page_name(&self) -> Result<Option<String>> {
        Ok(self.name.clone())
    }
}
