use clap::{Args, Parser};

/// CLI for the chat proxy.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chatmark-proxy",
    about = "GraphQL-style chat proxy in front of an OpenAI-compatible completions API"
)]
pub struct Cli {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Server options, shared with `chatmark serve`.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Listen address for the HTTP endpoints
    #[arg(long, env = "CHATMARK_PROXY_ADDR", default_value = "127.0.0.1:8788")]
    pub listen_addr: String,

    /// Base URL of the completions API (`/v1/chat/completions` is appended)
    #[arg(long, env = "CHATMARK_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Bearer key for the completions API
    #[arg(long, env = "CHATMARK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name sent upstream
    #[arg(long, env = "CHATMARK_MODEL", default_value = "deepseek-chat")]
    pub model: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "CHATMARK_UPSTREAM_TIMEOUT", default_value = "60")]
    pub timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "CHATMARK_MAX_BODY", default_value = "65536")]
    pub max_body_bytes: usize,
}
