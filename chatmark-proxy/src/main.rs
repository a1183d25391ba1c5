use anyhow::Result;
use clap::Parser;

use chatmark_proxy::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    chatmark_proxy::run_with_cli(Cli::parse()).await
}
