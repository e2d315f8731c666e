#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use glucose_vision::{models::AnalysisRequest, AnalysisError, AnalysisProvider};

pub const BOUNDARY: &str = "glucose-test-boundary";

/// Provider double that records what it was asked.
pub struct MockProvider {
    pub configured: bool,
    pub reply: Result<String, ()>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<AnalysisRequest>>,
}

impl MockProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { reply: Err(()), ..Self::plain() })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self { configured: false, ..Self::plain() })
    }

    fn plain() -> Self {
        Self {
            configured: true,
            reply: Ok(String::new()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.reply.clone().map_err(|_| AnalysisError::Provider)
    }
}

pub fn app(provider: Arc<MockProvider>) -> Router {
    glucose_vision::router(glucose_vision::AppState { provider }, 1024 * 1024)
}

pub struct FormPart<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn image_part<'a>(content_type: &'a str, data: &'a [u8]) -> FormPart<'a> {
    FormPart { name: "image", file_name: Some("chart"), content_type: Some(content_type), data }
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn analyze_request(parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze-glucose")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
