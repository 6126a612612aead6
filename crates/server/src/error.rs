//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kgchat_agents::AgentError;
use serde_json::json;

/// An error ready to leave the API: a status code and a client-facing
/// message carrying the upstream failure text.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(error: AgentError) -> Self {
        match &error {
            // The caller sent something we refuse to process
            AgentError::InvalidInput(_) | AgentError::Unsupported(_) => {
                ApiError::bad_request(error.to_string())
            }
            // An upstream service failed or misbehaved
            AgentError::Http(_)
            | AgentError::Llm(_)
            | AgentError::Extraction(_)
            | AgentError::QueryRejected(_)
            | AgentError::ContentUnavailable(_) => ApiError::bad_gateway(error.to_string()),
            // Our own storage or filesystem failed
            AgentError::Database(_) | AgentError::Io(_) => ApiError::internal(error.to_string()),
        }
    }
}

impl From<kgchat_db::DbError> for ApiError {
    fn from(error: kgchat_db::DbError) -> Self {
        ApiError::internal(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_errors_map_to_client_or_gateway_codes() {
        let err: ApiError = AgentError::Unsupported("Unsupported file type: application/pdf".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = AgentError::Llm("Gemini returned no candidates".into()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("Gemini"));
    }
}
