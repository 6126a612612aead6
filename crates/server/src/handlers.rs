//! Request handlers for the upload/query/info operations

use crate::{ApiError, AppState};
use axum::extract::{Multipart, State};
use axum::Json;
use kgchat_agents::{BuildOutcome, StoredContent};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct TextInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub num_entity: i64,
    pub num_relation: i64,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub query: String,
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub num_entity: i64,
    pub num_relation: i64,
}

/// Extract relations from inline text or a URL, then add them to the graph.
#[instrument(skip(state, input))]
pub async fn upload_text(
    State(state): State<AppState>,
    Json(input): Json<TextInput>,
) -> Result<Json<UploadResponse>, ApiError> {
    let stored = match (non_empty(input.text), non_empty(input.url)) {
        (Some(text), _) => state.ingestor.ingest_text(&text).await?,
        (None, Some(url)) => state.ingestor.ingest_url(&url).await?,
        (None, None) => return Err(ApiError::bad_request("Empty input.")),
    };

    let outcome = construct(&state, &stored).await?;
    Ok(Json(upload_response("Text/URL processed.", outcome)))
}

/// Extract relations from an uploaded text or audio file.
#[instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        let stored = state
            .ingestor
            .ingest_file(&filename, &content_type, bytes.to_vec())
            .await?;

        let outcome = construct(&state, &stored).await?;
        return Ok(Json(upload_response("File processed.", outcome)));
    }

    Err(ApiError::bad_request("Empty input."))
}

/// Answer a question against the knowledge graph.
#[instrument(skip(state, input))]
pub async fn query(
    State(state): State<AppState>,
    Json(input): Json<TextInput>,
) -> Result<Json<QueryResponse>, ApiError> {
    let question = non_empty(input.text).ok_or_else(|| ApiError::bad_request("Empty input."))?;

    let outcome = state.query.answer(&question).await?;
    Ok(Json(QueryResponse {
        answer: outcome.answer,
        query: outcome.query,
        context: outcome.context,
    }))
}

/// Current entity and relationship totals.
pub async fn info(State(state): State<AppState>) -> Result<Json<InfoResponse>, ApiError> {
    let counts = state.repo.counts().await?;
    Ok(Json(InfoResponse {
        num_entity: counts.entities,
        num_relation: counts.relationships,
    }))
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

async fn construct(state: &AppState, stored: &StoredContent) -> Result<BuildOutcome, ApiError> {
    Ok(state.builder.construct_from_text(&stored.text).await?)
}

fn upload_response(message: &str, outcome: BuildOutcome) -> UploadResponse {
    UploadResponse {
        message: message.to_string(),
        num_entity: outcome.counts.entities,
        num_relation: outcome.counts.relationships,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
