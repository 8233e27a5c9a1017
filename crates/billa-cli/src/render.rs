//! Terminal output helpers.

use billa_core::group::SavedGroup;
use billa_core::history::HistoryRecord;
use billa_core::receipt::ReceiptData;
use billa_core::session::{BillSession, SessionEvent};
use billa_core::split::SplitLine;
use rust_decimal::Decimal;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn money(symbol: &str, amount: Decimal) -> String {
    format!("{}{:.2}", symbol, amount)
}

pub fn receipt(data: &ReceiptData, include_tax: bool) {
    println!("🧾 Receipt");
    for item in &data.items {
        println!(
            "  {:>4} x {:<28} {:>10}",
            item.quantity,
            item.name,
            money(&data.currency, item.total_price)
        );
    }
    println!("  {:<35} {:>10}", "Subtotal", money(&data.currency, data.subtotal()));
    if include_tax {
        println!("  {:<35} {:>10}", "Tax", money(&data.currency, data.tax));
    }
    println!(
        "  {:<35} {:>10}",
        "Total",
        money(&data.currency, data.displayed_total(include_tax))
    );
}

pub fn split(symbol: &str, lines: &[SplitLine]) {
    for line in lines {
        match &line.items {
            Some(items) => println!("  👤 {:<20} {:>10}  ({})", line.name, money(symbol, line.amount), items),
            None => println!("  👤 {:<20} {:>10}", line.name, money(symbol, line.amount)),
        }
    }
}

pub fn settled(session: &BillSession) {
    println!();
    println!("✅ Settled");
    split(session.currency(), session.split());
    println!(
        "  {:<23} {:>10}",
        "Total",
        money(session.currency(), session.settled_total())
    );
    if !session.items_available() {
        println!("  (receipt items are not available for this bill)");
    }
    if !session.reasoning_log().is_empty() {
        println!();
        println!("📝 {}", session.reasoning_log());
    }
}

pub fn history_row(record: &HistoryRecord, default_currency: &str) {
    println!(
        "{}  {}  {:<30} {:>10}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.bill_title,
        money(record.currency_or(default_currency), record.total_amount)
    );
}

pub fn group_row(group: &SavedGroup) {
    println!("{}  {:<20} {}", group.id, group.group_name, group.names.join(", "));
}

/// Prints whatever side-channel events arrived so far.
pub fn drain_events(events: &mut UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::GroupSaved { group_name, .. } => {
                println!("💾 Saved group '{}'", group_name)
            }
            SessionEvent::HistorySaved { bill_title, .. } => {
                println!("💾 Saved to history as '{}'", bill_title)
            }
            SessionEvent::GroupSaveFailed { message } => {
                eprintln!("⚠️  Could not save group: {}", message)
            }
            SessionEvent::HistorySaveFailed { message } => {
                eprintln!("⚠️  Could not save history: {}", message)
            }
            SessionEvent::PhaseChanged { from, to } => {
                tracing::debug!("[Cli] {} -> {}", from, to)
            }
            SessionEvent::ScanSuperseded { attempt } => {
                tracing::debug!("[Cli] Scan attempt {} superseded", attempt)
            }
        }
    }
}
