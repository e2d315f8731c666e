use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, multipart, Client};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    codec,
    models::{AnalysisResponse, ErrorBody, UploadedImage},
    routes::{ANALYZE_PATH, IMAGE_FIELD},
    session::{Effect, SessionEvent, UploadSession, UploadSessionState, GENERIC_FAILURE_MESSAGE},
};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}")]
    Status { status: u16, message: Option<String> },
    #[error("decode error: {0}")]
    Decode(String),
}

impl TransportError {
    /// Server-supplied message when there is one, a generic line otherwise.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Status { message: Some(message), .. } if !message.is_empty() => {
                message.clone()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn submit(&self, image: &UploadedImage) -> Result<String, TransportError>;

    async fn fetch_example(&self, url: &str) -> Result<UploadedImage, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn submit(&self, image: &UploadedImage) -> Result<String, TransportError> {
        let part = multipart::Part::bytes(image.content.to_vec())
            .file_name(image.file_name.clone().unwrap_or_else(|| "upload".to_string()))
            .mime_str(&image.media_type)
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self.client
            .post(self.resolve(ANALYZE_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body).ok().map(|b| b.error);
            return Err(TransportError::Status { status: status.as_u16(), message });
        }

        let parsed: AnalysisResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(parsed.analysis)
    }

    async fn fetch_example(&self, url: &str) -> Result<UploadedImage, TransportError> {
        let response = self.client
            .get(self.resolve(url))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { status: status.as_u16(), message: None });
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let content = response.bytes().await.map_err(|e| TransportError::Network(e.to_string()))?;
        let media_type = declared.unwrap_or_else(|| codec::sniff_media_type(&content).to_string());
        let file_name = url.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or("example");

        Ok(UploadedImage::new(content, media_type).with_file_name(file_name))
    }
}

/// Runs an [`UploadSession`] against a transport, executing each effect it emits.
pub struct SessionDriver<T> {
    session: UploadSession,
    transport: T,
}

impl<T: AnalysisTransport> SessionDriver<T> {
    pub fn new(transport: T) -> Self {
        Self { session: UploadSession::new(), transport }
    }

    pub fn state(&self) -> &UploadSessionState {
        self.session.state()
    }

    pub async fn select_file(&mut self, image: UploadedImage) {
        let preview = image.preview_data_uri();
        self.handle(SessionEvent::FileSelected { image, preview }).await;
    }

    pub async fn select_example(&mut self, url: impl Into<String>) {
        self.handle(SessionEvent::ExampleRequested { url: url.into() }).await;
    }

    pub async fn submit(&mut self) {
        self.handle(SessionEvent::SubmitRequested { at: Instant::now() }).await;
    }

    pub async fn handle(&mut self, event: SessionEvent) {
        let mut next = self.session.dispatch(event);
        while let Some(effect) = next.take() {
            let follow_up = self.run(effect).await;
            next = self.session.dispatch(follow_up);
        }
    }

    async fn run(&self, effect: Effect) -> SessionEvent {
        match effect {
            Effect::FetchExample { url } => match self.transport.fetch_example(&url).await {
                Ok(image) => SessionEvent::ExampleLoaded { image, preview: url },
                Err(e) => {
                    error!("❌ Failed to load example {}: {}", url, e);
                    SessionEvent::ExampleFailed
                }
            },
            Effect::Submit { image } => {
                info!("📤 Submitting {} byte image", image.size());
                let outcome = self.transport.submit(&image).await.map_err(|e| {
                    error!("❌ Analysis request failed: {}", e);
                    e.user_message()
                });
                SessionEvent::Completed { outcome, at: Instant::now() }
            }
        }
    }
}
