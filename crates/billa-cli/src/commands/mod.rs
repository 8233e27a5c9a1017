pub mod auth;
pub mod groups;
pub mod history;
pub mod revise;
pub mod split;

use crate::context::AppContext;
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub fn show_config(ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;
    println!("[api]");
    println!("  scan_url      = {}", config.api.scan_url);
    println!("  split_url     = {}", config.api.split_url);
    println!("  chat_url      = {}", config.api.chat_url);
    println!("  timeout_secs  = {}", config.api.timeout_secs);
    println!("[store]");
    if config.store.is_configured() {
        println!("  url           = {}", config.store.url);
    } else {
        println!("  (not configured, guest mode)");
    }
    println!("[session]");
    println!("  default_instruction = {}", config.session.default_instruction);
    println!("  default_currency    = {}", config.session.default_currency);
    println!("  include_tax_by_default = {}", config.session.include_tax_by_default);
    Ok(())
}

/// Prints `label` and reads one trimmed line from stdin.
pub async fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}
