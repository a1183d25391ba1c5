//! Library entrypoint for chatmark-proxy so the `chatmark` CLI can run the
//! proxy in-process.
//!
//! The proxy accepts a small GraphQL-shaped surface (`hello`, `testUpstream`,
//! `sendMessage`) and forwards chat prompts to an OpenAI-compatible
//! completions endpoint.

pub mod cli;
pub mod config;
pub mod graphql;
pub mod server;
pub mod upstream;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::ProxyConfig;

pub use server::{router, AppState};
pub use upstream::{ChatCompletionsClient, Completion, CompletionBackend, UpstreamError};

pub fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;
    Ok(())
}

/// Run the proxy using CLI args (parsed by the caller).
pub async fn run_with_cli(cli: cli::Cli) -> Result<()> {
    init_tracing(cli.verbose)?;
    let cfg = ProxyConfig::from_cli(&cli)?;
    server::serve(cfg).await
}
