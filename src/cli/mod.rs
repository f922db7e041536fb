use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Directory served for any GET route that is not an API endpoint.
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: String,

    /// Answer invalid conversations with 400 instead of 500.
    #[arg(long, env = "CONVERSATION_CLIENT_ERRORS", default_value = "false")]
    pub conversation_client_errors: bool,

    // --- Chat LLM Provider Args ---
    /// API Key for the Gemini API.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-2.5-flash, gemini-2.5-pro)
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-2.5-flash")]
    pub chat_model: String,

    /// Base URL for the Gemini API (e.g., https://generativelanguage.googleapis.com/v1beta)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, the client falls back to the public endpoint
    pub chat_base_url: Option<String>,

    /// Optional JSON file overriding the system instructions ({"generate_text": "...", "chat": "..."}).
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
