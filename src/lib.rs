pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod validation;

use cli::Args;
use config::prompt::resolve_prompts;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use log::info;
use server::Server;
use server::api::AppState;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Static Directory: {}", args.static_dir);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("client default"));
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Conversation Client Errors: {}", args.conversation_client_errors);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let prompts = resolve_prompts(args.prompts_path.as_deref())?;

    let chat_api_key = if !args.chat_api_key.is_empty() {
        Some(args.chat_api_key.clone())
    } else {
        None
    };
    let chat_config = LlmConfig {
        api_key: chat_api_key,
        completion_model: Some(args.chat_model.clone()),
        base_url: args.chat_base_url.clone(),
    };
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Model={}, BaseURL={}",
        args.chat_model,
        chat_client.get_base_url().as_deref().unwrap_or("unknown")
    );

    let state = AppState::new(chat_client, args.chat_model.clone())
        .with_prompts(prompts)
        .with_conversation_client_errors(args.conversation_client_errors);

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state, args);
    server.run().await?;

    Ok(())
}
