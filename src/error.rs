use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

use crate::models::ErrorBody;

pub const MISSING_INPUT_MESSAGE: &str = "No image was provided";
pub const CONFIGURATION_MESSAGE: &str =
    "Anthropic API key is not configured. Please set ANTHROPIC_API_KEY in your .env file";
pub const INVALID_UPLOAD_MESSAGE: &str = "Invalid image upload";
pub const PROVIDER_MESSAGE: &str = "Error processing the image with the Claude API";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    Configuration,
    BadRequest,
    Provider,
}

/// Failures an analysis request can end in. Messages are safe to show to users.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,
    #[error("{}", CONFIGURATION_MESSAGE)]
    Configuration,
    #[error("{}", INVALID_UPLOAD_MESSAGE)]
    BadRequest,
    #[error("{}", PROVIDER_MESSAGE)]
    Provider,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::MissingInput => ErrorKind::MissingInput,
            AnalysisError::Configuration => ErrorKind::Configuration,
            AnalysisError::BadRequest => ErrorKind::BadRequest,
            AnalysisError::Provider => ErrorKind::Provider,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::MissingInput | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration | ErrorKind::Provider => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}
