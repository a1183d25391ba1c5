//! # chatmark CLI
//!
//! Command-line interface for chatmark: render chat markdown to HTML, chat
//! through a running proxy, or run the proxy itself.

mod commands;
mod session;

use std::path::PathBuf;

use chatmark_proxy::cli::ServerArgs;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a renderer configuration file (YAML)
    #[arg(long, global = true, env = "CHATMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Styling preset, overriding the one in the configuration file
    #[arg(long, global = true, value_enum)]
    preset: Option<PresetArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown message to an HTML fragment
    Render {
        /// Input file (reads stdin when omitted or `-`)
        input: Option<PathBuf>,

        /// Wrap the fragment in a standalone HTML page
        #[arg(long)]
        page: bool,

        /// Page title when using --page
        #[arg(long, default_value = "chatmark")]
        title: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the built-in sample message
    Demo {
        /// Wrap the fragment in a standalone HTML page
        #[arg(long)]
        page: bool,

        /// Print the markdown source instead of HTML
        #[arg(long)]
        source: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive chat through a running proxy
    Chat {
        /// GraphQL endpoint of the proxy
        #[arg(
            long,
            env = "CHATMARK_ENDPOINT",
            default_value = "http://127.0.0.1:8788/graphql"
        )]
        endpoint: String,

        /// Write an HTML transcript here when the session ends
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Print replies as HTML fragments instead of raw markdown
        #[arg(long)]
        html: bool,
    },

    /// Run the chat proxy
    Serve(ServerArgs),
}

#[derive(Copy, Clone, ValueEnum)]
pub enum PresetArg {
    Rich,
    Compact,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let load = || commands::load_config(cli.config.as_deref(), cli.preset);

    match cli.command {
        Commands::Render {
            input,
            page,
            title,
            output,
        } => {
            let opts = commands::RenderOptions {
                page,
                title,
                output,
            };
            commands::render_input(load()?, input.as_deref(), opts)
        }
        Commands::Demo {
            page,
            source,
            output,
        } => commands::demo(load()?, page, source, output.as_deref()),
        Commands::Chat {
            endpoint,
            transcript,
            html,
        } => commands::chat(load()?, &endpoint, transcript.as_deref(), html).await,
        Commands::Serve(args) => commands::serve(&args).await,
    }
}
