//! In-process mock of the LMNOP backend.
//!
//! Every request is recorded; responses come from a script keyed by method
//! and path, defaulting to `200 null`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use lmnop_client::{Config, LmsContext, Location, MemoryStorage};

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Value of the Authorization header, if sent.
    pub fn authorization(&self) -> Option<String> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    /// Body as lossy UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    script: Arc<Mutex<HashMap<(Method, String), (StatusCode, String)>>>,
}

/// Handle on a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub base_url: String,
    state: MockState,
}

impl MockBackend {
    /// Starts a backend on a free local port.
    pub async fn start() -> Self {
        let state = MockState::default();
        let router = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Scripts the response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("invalid status");
        self.state
            .script
            .lock()
            .expect("script poisoned")
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests poisoned").clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request received")
    }

    /// A context pointed at this backend with an in-memory session,
    /// starting on `page`.
    pub fn context(&self, page: &str) -> (LmsContext, Arc<Location>) {
        let config = Config {
            api_base_url: self.base_url.clone(),
            ..Default::default()
        };
        let location = Arc::new(Location::new(page));
        let ctx = LmsContext::init(config, Arc::new(MemoryStorage::new()), location.clone())
            .expect("Failed to build context");
        (ctx, location)
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state
        .requests
        .lock()
        .expect("requests poisoned")
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            headers,
            body,
        });

    let scripted = state
        .script
        .lock()
        .expect("script poisoned")
        .get(&(method, path))
        .cloned();
    let (status, body) = scripted.unwrap_or((StatusCode::OK, "null".to_string()));

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
