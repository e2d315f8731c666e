use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Credential;
use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, ContentPart};

pub const MODEL: &str = "claude-sonnet-4-5-20250929";
pub const MAX_TOKENS: u32 = 2048;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Returned when the first response block is not text.
pub const EXTRACTION_FALLBACK: &str = "Could not obtain the analysis";

const LOGGED_DATA_PREFIX: usize = 50;

#[derive(Debug, Error)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("authentication rejected (status {0})")]
    Authentication(StatusCode),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("API error: status={status} body={body}")]
    Api { status: StatusCode, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("response contained no content blocks")]
    EmptyContent,
}

/// The outbound side of an analysis: one completion call per request.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;
}

// Shortens long base64 `data` strings before a payload is logged.
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                match val {
                    serde_json::Value::String(s)
                        if key == "data" && s.len() > LOGGED_DATA_PREFIX * 2 =>
                    {
                        *val = serde_json::Value::String(format!(
                            "{}...[truncated {} chars]",
                            &s[..LOGGED_DATA_PREFIX],
                            s.len() - LOGGED_DATA_PREFIX
                        ));
                    }
                    _ => truncate_base64_in_json(val),
                }
            }
        }
        serde_json::Value::Array(arr) => arr.iter_mut().for_each(truncate_base64_in_json),
        _ => {}
    }
}

pub struct ClaudeClient {
    client: Client,
    credential: Credential,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(credential: Credential, base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), credential, base_url: base_url.into() }
    }

    async fn perform_api_call(
        &self,
        api_key: &str,
        request: &AnalysisRequest,
    ) -> Result<MessagesResponse, ClaudeError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest::from_request(request);

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(mut logged) = serde_json::to_value(&body) {
                truncate_base64_in_json(&mut logged);
                debug!("📤 Request body: {}", logged);
            }
        }
        info!("🔗 Calling {} with model {}", url, MODEL);

        let response = self.client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClaudeError::Http(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ClaudeError::Authentication(status)
                }
                StatusCode::TOO_MANY_REQUESTS => ClaudeError::RateLimited(error_body),
                _ => ClaudeError::Api { status, body: error_body },
            });
        }

        let response_text = response.text().await.map_err(|e| ClaudeError::Http(e.to_string()))?;
        serde_json::from_str(&response_text).map_err(|e| ClaudeError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AnalysisProvider for ClaudeClient {
    fn is_configured(&self) -> bool {
        self.credential.is_configured()
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        let Some(api_key) = self.credential.as_key() else {
            return Err(AnalysisError::Configuration);
        };

        let outcome = self
            .perform_api_call(api_key, request)
            .await
            .and_then(|response| extract_analysis(&response));

        match outcome {
            Ok(text) => {
                info!("✅ Analysis received ({} chars)", text.len());
                Ok(text)
            }
            Err(e) => {
                error!("❌ Claude API call failed: {}", e);
                Err(AnalysisError::Provider)
            }
        }
    }
}

// --- Wire Types ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

impl<'a> MessagesRequest<'a> {
    fn from_request(request: &'a AnalysisRequest) -> Self {
        let content = request.parts().iter().map(|part| match part {
            ContentPart::Image { data, media_type } => RequestBlock::Image {
                source: ImageSource { source_type: "base64", media_type, data },
            },
            ContentPart::Text { text } => RequestBlock::Text { text },
        }).collect();

        Self {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![Message { role: "user", content }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

fn extract_analysis(response: &MessagesResponse) -> Result<String, ClaudeError> {
    match response.content.first() {
        Some(ResponseBlock::Text { text }) => Ok(text.clone()),
        Some(ResponseBlock::Other) => {
            info!("⚠️ First content block is not text, using fallback");
            Ok(EXTRACTION_FALLBACK.to_string())
        }
        None => Err(ClaudeError::EmptyContent),
    }
}
