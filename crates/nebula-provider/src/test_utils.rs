use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::Value;

pub(crate) const TEST_API_KEY: &str = "test-api-key";

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub(crate) fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body should be json")
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Identity backend double that answers every request with one canned response and records what it received.
pub(crate) struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub(crate) async fn start(status: StatusCode, body: &'static str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState { status, body, requests: requests.clone() };
        let router = Router::new().fallback(record).with_state(state);

        Self { url: serve(router).await, requests }
    }

    pub(crate) fn single_request(&self) -> RecordedRequest {
        let requests = self.requests.lock().unwrap();
        assert_eq!(requests.len(), 1, "exactly one request should reach the backend");
        requests[0].clone()
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    let header_value = |name: &str| headers.get(name).and_then(|value| value.to_str().ok()).map(ToOwned::to_owned);

    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_owned(),
        query: uri.query().map(ToOwned::to_owned),
        api_key: header_value("x-api-key"),
        content_type: header_value("content-type"),
        body,
    });

    (state.status, [(header::CONTENT_TYPE, "application/json")], state.body)
}

pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    format!("http://{address}")
}

/// An url nothing listens on.
pub(crate) fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{address}")
}
