use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod context;
mod logging;
mod render;

use billa_infrastructure::{BillaPaths, ConfigService};
use context::AppContext;

#[derive(Parser)]
#[command(name = "billa")]
#[command(about = "Bill-a - scan a receipt and split the bill", long_about = None)]
struct Cli {
    /// Use this directory instead of the default config directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from BILLA_PASSWORD or prompted when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Scan a receipt photo and split it
    Split(commands::split::SplitArgs),
    /// Browse and manage past settlements
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Browse and manage saved participant groups
    Groups {
        #[command(subcommand)]
        action: commands::groups::GroupsAction,
    },
    /// Revise a past settlement by chatting with the assistant
    Revise {
        /// History record id
        record_id: String,
    },
    /// Print the active configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = BillaPaths::new(cli.config_dir.as_deref());
    let config = ConfigService::new(paths.clone()).get_config()?;
    let _guard = logging::init_logging(&config.logging, &paths);

    let ctx = AppContext::build(config, &paths)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, password).await?
        }
        Commands::Signup { email, password } => {
            commands::auth::signup(&ctx, &email, password).await?
        }
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Split(args) => commands::split::run(&ctx, args).await?,
        Commands::History { action } => commands::history::run(&ctx, action).await?,
        Commands::Groups { action } => commands::groups::run(&ctx, action).await?,
        Commands::Revise { record_id } => commands::revise::run(&ctx, &record_id).await?,
        Commands::Config => commands::show_config(&ctx)?,
    }

    Ok(())
}
