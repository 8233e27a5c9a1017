use crate::context::AppContext;
use crate::render;
use anyhow::{Context, Result};
use billa_application::RevisionChat;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Type a change, /apply to accept the latest proposal, /cancel to leave.";

/// Chats about a past settlement until the user applies a proposal or leaves.
pub async fn run(ctx: &AppContext, record_id: &str) -> Result<()> {
    let entry = ctx.history_service().resume(record_id).await?;
    let (orchestrator, mut events) = ctx.orchestrator();
    orchestrator.open(entry).await?;
    render::settled(&orchestrator.snapshot().await);

    let context = orchestrator.begin_revision().await?;
    let currency = context.currency.clone();
    let mut chat = RevisionChat::new(ctx.assistant(), context)?;

    println!();
    println!("{}", HELP);
    if let Some(greeting) = chat.messages().last() {
        println!("🤖 {}", greeting.content);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };

        match line.trim() {
            "/cancel" | "/quit" => break,
            "/apply" => {
                let Some((lines, reasoning)) = chat.latest_proposal() else {
                    println!("Nothing proposed yet");
                    continue;
                };
                orchestrator
                    .apply_revision(lines.to_vec(), reasoning.to_string())
                    .await?;
                render::settled(&orchestrator.snapshot().await);
                render::drain_events(&mut events);
                println!();
                println!("{}", orchestrator.share_summary().await);
                return Ok(());
            }
            text => {
                let Some(reply) = chat.send(text).await else {
                    continue;
                };
                println!("🤖 {}", reply.content);
                if let Some(splits) = &reply.splits {
                    render::split(&currency, splits);
                }
            }
        }
    }

    orchestrator.cancel_revision().await?;
    render::drain_events(&mut events);
    println!("No changes made");
    Ok(())
}
