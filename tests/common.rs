#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tinify_shrink::{Result, ShrinkError, TokenProvider};
use tokio::net::TcpListener;

pub const ORIGINAL_PATH: &str = "/images/a.png";
pub const COMPRESSED_PATH: &str = "/cdn/a-compressed.png";
pub const COMPRESS_PATH: &str = "/v1/tinify-png-shrink/action/compress";
pub const FILE_COMPRESSIONS_PATH: &str = "/api/tasks/images/compressions";

/// How the mock compression endpoint answers.
#[derive(Debug, Clone)]
pub enum CompressReply {
    /// 200 with `{"compressedImageURL": "<server>/cdn/a-compressed.png"}`, or
    /// `{"data": {"output": {"url": ...}}}` on the file compression route
    Url,
    /// 200 with the given raw body
    Body(String),
    /// The given status and body
    Status(u16, String),
}

pub struct MockState {
    base_url: String,
    reply: CompressReply,
    original_size: usize,
    compressed_size: usize,
    compress_hits: AtomicUsize,
    upload_hits: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
    last_content_type: Mutex<Option<String>>,
    last_body: Mutex<Option<String>>,
    download_authorization: Mutex<Option<String>>,
}

pub struct MockService {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockService {
    /// Start a mock compression service on an ephemeral local port.
    pub async fn start(reply: CompressReply, original_size: usize, compressed_size: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(MockState {
            base_url: base_url.clone(),
            reply,
            original_size,
            compressed_size,
            compress_hits: AtomicUsize::new(0),
            upload_hits: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
            last_content_type: Mutex::new(None),
            last_body: Mutex::new(None),
            download_authorization: Mutex::new(None),
        });

        let app = Router::new()
            .route(COMPRESS_PATH, post(compress_handler))
            .route(FILE_COMPRESSIONS_PATH, post(upload_handler))
            .route(ORIGINAL_PATH, get(original_handler))
            .route(COMPRESSED_PATH, get(compressed_handler))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, state }
    }

    pub fn compress_url(&self) -> String {
        format!("{}{}", self.base_url, COMPRESS_PATH)
    }

    pub fn image_url(&self) -> String {
        format!("{}{}", self.base_url, ORIGINAL_PATH)
    }

    pub fn compressed_url(&self) -> String {
        format!("{}{}", self.base_url, COMPRESSED_PATH)
    }

    pub fn compress_hits(&self) -> usize {
        self.state.compress_hits.load(Ordering::SeqCst)
    }

    pub fn upload_hits(&self) -> usize {
        self.state.upload_hits.load(Ordering::SeqCst)
    }

    pub fn last_body_text(&self) -> Option<String> {
        self.state.last_body.lock().unwrap().clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.state.last_content_type.lock().unwrap().clone()
    }

    pub fn last_body_json(&self) -> Option<serde_json::Value> {
        self.state
            .last_body
            .lock()
            .unwrap()
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap())
    }

    pub fn download_authorization(&self) -> Option<String> {
        self.state.download_authorization.lock().unwrap().clone()
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn compress_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.compress_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_authorization.lock().unwrap() = header_string(&headers, header::AUTHORIZATION);
    *state.last_content_type.lock().unwrap() = header_string(&headers, header::CONTENT_TYPE);
    *state.last_body.lock().unwrap() = Some(body);

    let (status, body) = match &state.reply {
        CompressReply::Url => (
            StatusCode::OK,
            serde_json::json!({
                "compressedImageURL": format!("{}{}", state.base_url, COMPRESSED_PATH)
            })
            .to_string(),
        ),
        CompressReply::Body(body) => (StatusCode::OK, body.clone()),
        CompressReply::Status(code, body) => (
            StatusCode::from_u16(*code).unwrap(),
            body.clone(),
        ),
    };

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn upload_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    state.upload_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_authorization.lock().unwrap() = header_string(&headers, header::AUTHORIZATION);
    *state.last_content_type.lock().unwrap() = header_string(&headers, header::CONTENT_TYPE);
    *state.last_body.lock().unwrap() = Some(String::from_utf8_lossy(&body).into_owned());

    let (status, body) = match &state.reply {
        CompressReply::Url => (
            StatusCode::OK,
            serde_json::json!({
                "data": { "output": { "url": format!("{}{}", state.base_url, COMPRESSED_PATH) } }
            })
            .to_string(),
        ),
        CompressReply::Body(body) => (StatusCode::OK, body.clone()),
        CompressReply::Status(code, body) => (
            StatusCode::from_u16(*code).unwrap(),
            body.clone(),
        ),
    };

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn original_handler(State(state): State<Arc<MockState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "image/png")],
        Body::from(vec![0u8; state.original_size]),
    )
        .into_response()
}

async fn compressed_handler(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    *state.download_authorization.lock().unwrap() =
        header_string(&headers, header::AUTHORIZATION);
    (
        [(header::CONTENT_TYPE, "image/png")],
        Body::from(vec![7u8; state.compressed_size]),
    )
        .into_response()
}

/// Token provider that records the domains it was asked for.
#[derive(Default)]
pub struct RecordingTokens {
    pub token: String,
    pub domains: Mutex<Vec<String>>,
}

impl RecordingTokens {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            domains: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> usize {
        self.domains.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenProvider for RecordingTokens {
    async fn fetch_token(&self, domain: &str) -> Result<String> {
        self.domains.lock().unwrap().push(domain.to_string());
        Ok(self.token.clone())
    }
}

/// Token provider that always fails.
pub struct FailingTokens;

#[async_trait]
impl TokenProvider for FailingTokens {
    async fn fetch_token(&self, _domain: &str) -> Result<String> {
        Err(ShrinkError::Auth("provider unavailable".to_string()))
    }
}
