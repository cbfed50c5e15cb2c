//! Shared helpers for tests: a local stand-in for the chat completions API,
//! configs pointing at it, and a multipart body builder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::{Config, LlmConfig};

pub const STUB_API_KEY: &str = "gsk_test_key";

const BOUNDARY: &str = "analyzer-test-boundary";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// An OpenAI-style chat completion carrying `content`.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "stub-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

pub fn stub_llm_config(base: &str, max_retries: u32) -> LlmConfig {
    LlmConfig {
        api_url: format!("{base}/chat/completions"),
        model: "stub-model".to_string(),
        max_tokens: 256,
        timeout_secs: 5,
        max_retries,
    }
}

/// Default config with the LLM endpoint pointed at `base`.
pub fn test_config(base: &str) -> Config {
    let api_url = format!("{base}/chat/completions");
    Config::from_lookup(|key| match key {
        "LLM_API_URL" => Some(api_url.clone()),
        "LLM_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Answers with "Analysis based on: <user message>" for the stub key, 401 otherwise.
pub fn echo_llm_router() -> Router {
    counting_echo_llm_router().0
}

/// Same as `echo_llm_router`, also counting every request it receives.
pub fn counting_echo_llm_router() -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                echo_completion(&headers, &body)
            }
        }),
    );
    (router, hits)
}

fn echo_completion(headers: &HeaderMap, body: &Value) -> Response {
    let expected = format!("Bearer {STUB_API_KEY}");
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}})),
        )
            .into_response();
    }

    let last = body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default();
    Json(completion_body(&format!("Analysis based on: {last}"))).into_response()
}

/// Builds a `multipart/form-data` body the way a browser form would.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `Content-Type` header value and the finished body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.bytes,
        )
    }
}
