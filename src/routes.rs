use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    claude::AnalysisProvider,
    codec::{self, CodecError},
    error::AnalysisError,
    examples,
    models::{AnalysisResponse, ErrorBody, ExampleInfo, HealthResponse, UploadedImage},
    prompt,
};

pub const ANALYZE_PATH: &str = "/api/analyze-glucose";
pub const IMAGE_FIELD: &str = "image";

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn AnalysisProvider>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(ANALYZE_PATH, post(analyze_glucose))
        .route("/api/health", get(health))
        .route("/api/examples", get(list_examples))
        .route("/examples/:name", get(get_example))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

pub async fn analyze_glucose(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    let span = info_span!("analyze_glucose", request_id = %Uuid::new_v4());
    run_analysis(state, multipart).instrument(span).await
}

async fn run_analysis(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    // Misconfiguration fails before the body is read.
    if !state.provider.is_configured() {
        info!("🚫 Rejecting request: API key not configured");
        return Err(AnalysisError::Configuration);
    }

    let multipart = multipart.map_err(|e| {
        warn!("⚠️ Rejecting upload: {}", e.body_text());
        AnalysisError::BadRequest
    })?;
    let image = read_image_field(multipart).await?.ok_or(AnalysisError::MissingInput)?;
    info!("🖼️ Received image: {} bytes, {}", image.size(), image.media_type);

    let payload = codec::encode(&image).map_err(|e| match e {
        CodecError::MissingInput => AnalysisError::MissingInput,
        other => {
            warn!("⚠️ Rejecting upload: {}", other);
            AnalysisError::BadRequest
        }
    })?;

    let request = prompt::build(payload);
    let analysis = state.provider.analyze(&request).await?;
    Ok(Json(AnalysisResponse { analysis }))
}

/// First `image` part only; later duplicates are never buffered.
async fn read_image_field(
    mut multipart: Multipart,
) -> Result<Option<UploadedImage>, AnalysisError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("⚠️ Failed to read multipart field: {}", e);
        AnalysisError::BadRequest
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let declared = field.content_type().map(|c| c.to_string());
        let file_name = field.file_name().map(|n| n.to_string());
        let content = field.bytes().await.map_err(|e| {
            warn!("⚠️ Failed to read image: {}", e);
            AnalysisError::BadRequest
        })?;

        let media_type = declared.unwrap_or_else(|| codec::sniff_media_type(&content).to_string());
        let mut uploaded = UploadedImage::new(content, media_type);
        uploaded.file_name = file_name;
        return Ok(Some(uploaded));
    }

    Ok(None)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        credential_configured: state.provider.is_configured(),
    })
}

pub async fn list_examples() -> Json<Vec<ExampleInfo>> {
    Json(examples::catalog())
}

pub async fn get_example(Path(name): Path<String>) -> Response {
    match examples::find(&name).and_then(|example| example.bytes().map(|bytes| (example, bytes))) {
        Some((example, bytes)) => {
            ([(header::CONTENT_TYPE, example.media_type)], bytes).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody { error: format!("Unknown example '{}'", name) }),
        )
            .into_response(),
    }
}
