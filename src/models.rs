use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An uploaded image, held only for one analysis attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub content: Bytes,
    pub media_type: String,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(content: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self { content: content.into(), media_type: media_type.into(), file_name: None }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `data:` URI usable as an `<img src>` preview.
    pub fn preview_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            base64::engine::general_purpose::STANDARD.encode(&self.content)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImagePayload {
    pub data: String,
    pub subtype: String,
}

impl EncodedImagePayload {
    pub fn media_type(&self) -> String {
        format!("image/{}", self.subtype)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Image { data: String, media_type: String },
    Text { text: String },
}

/// Ordered content of the single user turn sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    parts: Vec<ContentPart>,
}

impl AnalysisRequest {
    pub(crate) fn new(parts: Vec<ContentPart>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResponse {
    pub analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExampleInfo {
    pub name: String,
    pub title: String,
    pub url: String,
    pub media_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub credential_configured: bool,
}
