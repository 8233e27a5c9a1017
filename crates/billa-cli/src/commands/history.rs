use super::prompt;
use crate::context::AppContext;
use crate::render;
use anyhow::Result;
use billa_core::history::HistoryPayload;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List past settlements, newest first
    List,
    /// Show one settlement
    Show { record_id: String },
    /// Reopen a settlement, optionally re-splitting it
    Resume {
        record_id: String,
        /// Re-split with this instruction (needs receipt items)
        #[arg(long)]
        instruction: Option<String>,
        /// Re-split the pre-tax subtotal
        #[arg(long)]
        no_tax: bool,
    },
    /// Delete one or more settlements
    Delete {
        #[arg(required = true)]
        record_ids: Vec<String>,
    },
    /// Delete every settlement
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Number of bills and amount settled
    Stats,
}

pub async fn run(ctx: &AppContext, action: HistoryAction) -> Result<()> {
    let service = ctx.history_service();
    let currency = &ctx.config.session.default_currency;

    match action {
        HistoryAction::List => {
            let records = service.list().await?;
            if records.is_empty() {
                println!("No history yet");
            }
            for record in &records {
                render::history_row(record, currency);
            }
        }
        HistoryAction::Show { record_id } => {
            let record = service.get(&record_id).await?;
            render::history_row(&record, currency);
            if let HistoryPayload::Legacy(_) = record.data {
                println!("  (saved by an older version, items not available)");
            }
            render::split(record.currency_or(currency), record.data.split_lines());
            if let Some(reasoning) = record.reasoning_log.as_deref().filter(|r| !r.is_empty()) {
                println!();
                println!("📝 {}", reasoning);
            }
        }
        HistoryAction::Resume {
            record_id,
            instruction,
            no_tax,
        } => {
            let entry = service.resume(&record_id).await?;
            let (orchestrator, mut events) = ctx.orchestrator();
            orchestrator.open(entry).await?;

            if let Some(instruction) = instruction {
                orchestrator.reopen_review().await?;
                println!("🧮 Splitting again...");
                orchestrator.compute_split(&instruction, !no_tax).await?;
                orchestrator.flush_background().await;
            }

            render::settled(&orchestrator.snapshot().await);
            render::drain_events(&mut events);
        }
        HistoryAction::Delete { record_ids } => {
            if let [record_id] = record_ids.as_slice() {
                service.delete(record_id).await?;
            } else {
                service.delete_many(&record_ids).await?;
            }
            println!("🗑️  Deleted {} record(s)", record_ids.len());
        }
        HistoryAction::Clear { yes } => {
            if !yes && prompt("Delete all history? [y/N] ").await?.to_lowercase() != "y" {
                println!("Cancelled");
                return Ok(());
            }
            service.clear().await?;
            println!("🗑️  History cleared");
        }
        HistoryAction::Stats => {
            let stats = service.stats().await?;
            println!("Bills settled: {}", stats.total_bills);
            println!("Total amount:  {}", render::money(currency, stats.total_amount));
        }
    }
    Ok(())
}
