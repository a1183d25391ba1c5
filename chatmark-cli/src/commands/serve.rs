use anyhow::Result;
use chatmark_proxy::{cli::ServerArgs, config::ProxyConfig};

/// Run the proxy in-process.
pub async fn serve(args: &ServerArgs) -> Result<()> {
    let cfg = ProxyConfig::from_args(args)?;
    println!("chat proxy listening on http://{}", cfg.listen_addr);
    chatmark_proxy::server::serve(cfg).await
}
