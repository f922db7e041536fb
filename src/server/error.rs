use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use thiserror::Error;

use crate::llm::chat::CompletionError;
use crate::models::envelope::Envelope;
use crate::validation::ValidationError;

/// Every way a request can fail, rendered as a failure envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request body must be valid JSON!")]
    MalformedBody,

    #[error("Prompt must be a non-empty string!")]
    InvalidPrompt,

    #[error("{source}")]
    InvalidConversation {
        #[source]
        source: ValidationError,
        status: StatusCode,
    },

    // Upstream details stay in the logs.
    #[error("Failed to get a reply, the server seems to be having problems!")]
    Completion(#[from] CompletionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody | ApiError::InvalidPrompt => StatusCode::BAD_REQUEST,
            ApiError::InvalidConversation { status, .. } => *status,
            ApiError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(Envelope::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_errors_are_masked() {
        let err = ApiError::from(CompletionError::Api { status: 403, body: "API key invalid".into() });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("API key"));
    }

    #[test]
    fn conversation_errors_keep_configured_status() {
        let err = ApiError::InvalidConversation {
            source: ValidationError::Empty,
            status: StatusCode::BAD_REQUEST,
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Conversation must not be empty!");
    }
}
