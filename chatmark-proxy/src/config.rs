use std::time::Duration;

use anyhow::{bail, Result};

use crate::cli::{Cli, ServerArgs};

/// Upstream completions API settings.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Full chat-completions endpoint, if a base URL is configured.
    pub fn endpoint(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}/v1/chat/completions", base.trim_end_matches('/')))
    }
}

/// Runtime configuration derived from CLI/env.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub listen_addr: String,
    pub max_body_bytes: usize,
    pub upstream: UpstreamConfig,
}

impl ProxyConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::from_args(&cli.server)
    }

    pub fn from_args(args: &ServerArgs) -> Result<Self> {
        if args.max_body_bytes == 0 {
            bail!("--max-body-bytes must be greater than zero");
        }
        // Empty env values count as unset
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        Ok(Self {
            listen_addr: args.listen_addr.clone(),
            max_body_bytes: args.max_body_bytes,
            upstream: UpstreamConfig {
                base_url: non_empty(&args.upstream_url),
                api_key: non_empty(&args.api_key),
                model: args.model.clone(),
                timeout: Duration::from_secs(args.timeout_secs),
            },
        })
    }
}
