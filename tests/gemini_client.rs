//! Drives `GeminiChatClient` against a fake Gemini endpoint served on an ephemeral port.

use axum::{
    extract::State,
    http::{ HeaderMap, StatusCode, Uri },
    response::IntoResponse,
    Json,
    Router,
};
use gemini_relay::llm::chat::gemini::GeminiChatClient;
use gemini_relay::llm::chat::{ new_client, ChatClient, CompletionError, ContentBlock };
use gemini_relay::llm::LlmConfig;
use gemini_relay::models::chat::Role;
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn fake_generate(
    State(upstream): State<Upstream>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>
) -> impl IntoResponse {
    upstream.captured.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body,
    });
    (upstream.status, Json(upstream.reply.clone()))
}

/// Starts the fake upstream and returns its base URL plus the request log.
async fn spawn_upstream(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let upstream = Upstream { status, reply, captured: captured.clone() };
    let app = Router::new().fallback(fake_generate).with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/v1beta", addr), captured)
}

fn client(base_url: String) -> GeminiChatClient {
    GeminiChatClient::new("test-key".to_string(), None, Some(base_url)).unwrap()
}

#[tokio::test]
async fn sends_contents_and_system_instruction() {
    let (base_url, captured) = spawn_upstream(
        StatusCode::OK,
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "Sampurasun" }] } }]
        })
    ).await;

    let contents = vec![
        ContentBlock::text(Role::User, "hi"),
        ContentBlock::text(Role::Model, "halo"),
        ContentBlock::text(Role::User, "kumaha?")
    ];
    let resp = client(base_url)
        .generate("gemini-2.5-flash", &contents, Some("You must reply in Sundanese.")).await
        .unwrap();

    assert_eq!(resp.text, "Sampurasun");

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].path, "/v1beta/models/gemini-2.5-flash:generateContent");
    assert_eq!(captured[0].api_key.as_deref(), Some("test-key"));
    assert_eq!(
        captured[0].body,
        json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "hi" }] },
                { "role": "model", "parts": [{ "text": "halo" }] },
                { "role": "user", "parts": [{ "text": "kumaha?" }] }
            ],
            "systemInstruction": { "parts": [{ "text": "You must reply in Sundanese." }] }
        })
    );
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let (base_url, _) = spawn_upstream(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "code": 429, "message": "quota" } })
    ).await;

    let contents = vec![ContentBlock::text(Role::User, "hi")];
    let err = client(base_url).generate("gemini-2.5-flash", &contents, None).await.unwrap_err();

    match err {
        CompletionError::Api { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("quota"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn response_without_text_is_an_error() {
    let (base_url, _) = spawn_upstream(StatusCode::OK, json!({ "candidates": [] })).await;

    let contents = vec![ContentBlock::text(Role::User, "hi")];
    let err = client(base_url).generate("gemini-2.5-flash", &contents, None).await.unwrap_err();
    assert!(matches!(err, CompletionError::EmptyResponse));
}

#[tokio::test]
async fn unreachable_upstream_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let contents = vec![ContentBlock::text(Role::User, "hi")];
    let err = client(format!("http://{}", addr))
        .generate("gemini-2.5-flash", &contents, None).await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)));
}

#[tokio::test]
async fn factory_uses_configured_model_when_call_has_none() {
    let (base_url, captured) = spawn_upstream(
        StatusCode::OK,
        json!({ "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }] })
    ).await;

    let config = LlmConfig {
        api_key: Some("k".to_string()),
        completion_model: Some("gemini-2.5-pro".to_string()),
        base_url: Some(base_url),
    };
    let chat = new_client(&config).unwrap();
    chat.generate("", &[ContentBlock::text(Role::User, "hi")], None).await.unwrap();

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured[0].path, "/v1beta/models/gemini-2.5-pro:generateContent");
}
