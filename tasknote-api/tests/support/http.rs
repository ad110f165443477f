//! In-process HTTP helpers: build the full router over any store and drive
//! it with `oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tasknote_api::{create_api_router, ApiConfig};
use tasknote_storage::TaskNoteStore;
use tower::ServiceExt;

/// Response parts a test cares about.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value, String> {
        serde_json::from_slice(&self.body)
            .map_err(|e| format!("Failed to parse response body: {}", e))
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get("location")
            .and_then(|value| value.to_str().ok())
    }
}

pub fn test_app(store: impl TaskNoteStore + 'static) -> Router {
    let store: Arc<dyn TaskNoteStore> = Arc::new(store);
    create_api_router(store, &ApiConfig::default())
}

/// Send a request with an optional raw body and content type.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: Option<String>,
) -> Result<TestResponse, String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .map_err(|e| format!("Failed to build request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("Request failed: {:?}", e))?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| format!("Failed to read body: {:?}", e))?;

    Ok(TestResponse {
        status,
        headers,
        body: body.to_vec(),
    })
}

/// Send a request with an optional JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<TestResponse, String> {
    match body {
        Some(json) => {
            send_raw(app, method, uri, Some("application/json"), Some(json.to_string())).await
        }
        None => send_raw(app, method, uri, None, None).await,
    }
}
