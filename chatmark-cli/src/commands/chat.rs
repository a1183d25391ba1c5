use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chatmark_core::{RenderConfig, Renderer};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::session::{ChatSession, Exchange, GraphqlExchange};

/// Line-oriented chat loop. `/clear` starts over, `/quit` or EOF ends the
/// session.
pub async fn chat(
    config: RenderConfig,
    endpoint: &str,
    transcript: Option<&Path>,
    html: bool,
) -> Result<()> {
    let renderer = Renderer::new(config);
    let mut session = ChatSession::new(GraphqlExchange::new(endpoint));

    println!("Chatting via {endpoint}. Type /clear to start over, /quit to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        if let Some(reply) = session.send(&line).await {
            if html {
                println!("{}", renderer.render(&reply.content));
            } else {
                println!("{}", reply.content);
            }
        }
    }

    if let Some(path) = transcript {
        write_transcript(&renderer, &session, path)?;
    }
    Ok(())
}

fn write_transcript<E: Exchange>(
    renderer: &Renderer,
    session: &ChatSession<E>,
    path: &Path,
) -> Result<()> {
    let page =
        chatmark_render::render_transcript(renderer, session.messages(), session.conversation_id())?;
    std::fs::write(path, page).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), messages = session.messages().len(), "wrote transcript");
    Ok(())
}
