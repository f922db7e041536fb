use crate::config::prompt::SystemPrompts;
use crate::llm::chat::{ ChatClient, ContentBlock };
use crate::models::chat::Role;
use crate::models::envelope::Envelope;
use crate::server::error::ApiError;
use crate::validation::validate_conversation;
use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    extract::{ State, rejection::JsonRejection },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::ServeDir;
use log::{ info, warn, error, debug };

const GENERATE_TEXT_SUCCESS: &str = "Answered by Gemini!";
const CHAT_SUCCESS: &str = "Replied by Google Gemini!";

#[derive(Clone)]
pub struct AppState {
    chat_client: Arc<dyn ChatClient>,
    model: String,
    prompts: Arc<SystemPrompts>,
    conversation_error_status: StatusCode,
}

impl AppState {
    pub fn new(chat_client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            chat_client,
            model: model.into(),
            prompts: Arc::new(SystemPrompts::default()),
            conversation_error_status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn with_prompts(mut self, prompts: SystemPrompts) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    /// Report invalid conversations as 400 rather than 500.
    pub fn with_conversation_client_errors(mut self, enabled: bool) -> Self {
        self.conversation_error_status = if enabled {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        self
    }
}

pub fn build_router(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/generate-text", post(generate_text_handler))
        .route("/api/chat", post(chat_handler));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors).with_state(state)
}

fn parse_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        // No JSON content type: treat as an empty body so field checks report it.
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Null),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::MalformedBody)
        }
    }
}

async fn generate_text_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>
) -> Result<Json<Envelope>, ApiError> {
    let body = parse_body(body)?;

    let prompt = match body.get("prompt") {
        Some(Value::String(p)) if !p.is_empty() => p.as_str(),
        other => {
            warn!("POST /generate-text rejected: prompt={:?}", other);
            return Err(ApiError::InvalidPrompt);
        }
    };
    debug!("POST /generate-text prompt_len={}", prompt.len());

    let contents = [ContentBlock::text(Role::User, prompt)];
    let resp = state.chat_client
        .generate(&state.model, &contents, Some(state.prompts.generate_text.as_str())).await
        .map_err(|e| {
            error!("POST /generate-text completion failed: {}", e);
            ApiError::from(e)
        })?;

    info!("POST /generate-text answered ({} chars)", resp.text.len());
    Ok(Json(Envelope::success(GENERATE_TEXT_SUCCESS, resp.text)))
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>
) -> Result<Json<Envelope>, ApiError> {
    let body = parse_body(body)?;

    let turns = validate_conversation(body.get("conversation")).map_err(|source| {
        warn!("POST /api/chat rejected: {}", source);
        ApiError::InvalidConversation {
            source,
            status: state.conversation_error_status,
        }
    })?;
    debug!("POST /api/chat turns={}", turns.len());

    let contents: Vec<ContentBlock> = turns.iter().map(ContentBlock::from).collect();
    let resp = state.chat_client
        .generate(&state.model, &contents, Some(state.prompts.chat.as_str())).await
        .map_err(|e| {
            error!("POST /api/chat completion failed: {}", e);
            ApiError::from(e)
        })?;

    info!("POST /api/chat replied ({} chars)", resp.text.len());
    Ok(Json(Envelope::success(CHAT_SUCCESS, resp.text)))
}
