#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use parser_console::AppState;
use parser_console::config::Config;
use serde_json::Value;
use tempfile::TempDir;

/// One request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn is(&self, method: Method, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

pub struct Reply {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Reply::status(200, body)
    }

    pub fn status(code: u16, body: Value) -> Self {
        Reply {
            status: StatusCode::from_u16(code).unwrap(),
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn bytes(code: u16, body: &[u8]) -> Self {
        Reply {
            status: StatusCode::from_u16(code).unwrap(),
            content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            body: body.to_vec(),
        }
    }

    pub fn not_found() -> Self {
        Reply::status(404, serde_json::json!({"detail": "Not Found"}))
    }
}

type Responder = dyn Fn(&Recorded) -> Reply + Send + Sync;

struct MockState {
    log: Mutex<Vec<Recorded>>,
    responder: Box<Responder>,
}

/// HTTP backend on an ephemeral port that records every request and
/// answers through a test-supplied closure.
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
    dir: TempDir,
}

impl MockBackend {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let state = Arc::new(MockState {
            log: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            base_url: format!("http://{}", addr),
            state,
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.is(method.clone(), path))
            .count()
    }

    /// Scratch directory for session and export files.
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn config(&self) -> Config {
        let base = self.base_url.clone();
        let session = self.dir().join("session.json").display().to_string();
        let exports = self.dir().join("exports").display().to_string();
        Config::from_lookup(move |key| match key {
            "API_BASE" => Some(base.clone()),
            "SESSION_FILE" => Some(session.clone()),
            "EXPORT_DIR" => Some(exports.clone()),
            "JOB_POLL_INTERVAL_MS" => Some("10".into()),
            "REQUEST_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::from_config(self.config()).unwrap()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let reply = (state.responder)(&recorded);
    state.log.lock().unwrap().push(recorded);
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

/// A signed token carrying `exp`, as the backend would issue it.
pub fn token_expiring_at(exp: i64) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({"sub": "operator", "exp": exp}),
        &jsonwebtoken::EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}
