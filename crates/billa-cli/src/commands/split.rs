use crate::context::AppContext;
use crate::render;
use anyhow::{Context, Result, bail};
use billa_core::BillaError;
use billa_core::session::SessionEntry;
use billa_infrastructure::receipt_file::load_receipt_image;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SplitArgs {
    /// Receipt photo
    pub image: PathBuf,

    /// Participants, comma separated
    #[arg(long, short, value_delimiter = ',')]
    pub people: Vec<String>,

    /// Start from a saved group
    #[arg(long)]
    pub group: Option<String>,

    /// Save the participant list as a group with this name
    #[arg(long)]
    pub save_group: Option<String>,

    /// Title for the history record
    #[arg(long)]
    pub title: Option<String>,

    /// How to split, e.g. "Alice had the burger, rest equally"
    #[arg(long, short, default_value = "")]
    pub instruction: String,

    /// Split the pre-tax subtotal
    #[arg(long)]
    pub no_tax: bool,
}

pub async fn run(ctx: &AppContext, args: SplitArgs) -> Result<()> {
    let (orchestrator, mut events) = ctx.orchestrator();

    let entry = match &args.group {
        Some(group_id) => ctx.group_service().start_session(group_id).await?,
        None => SessionEntry::FreshStart,
    };
    orchestrator.open(entry).await?;

    let seeded = orchestrator.snapshot().await.participants().clone();
    for name in &args.people {
        // Names already seeded from the group are fine to repeat.
        if seeded.contains(name.trim()) {
            continue;
        }
        orchestrator.add_participant(name).await?;
    }
    orchestrator.set_title(args.title.as_deref()).await;
    if args.save_group.is_some() {
        orchestrator.request_group_save(args.save_group.as_deref()).await?;
    }

    let participants = orchestrator.snapshot().await.participants().to_vec();
    println!("👥 {}", participants.join(", "));
    orchestrator.begin_capture().await?;

    let image = load_receipt_image(&args.image)
        .await
        .with_context(|| format!("Failed to load {}", args.image.display()))?;
    println!("📷 Scanning {}...", image.file_name);
    match orchestrator.scan(image).await {
        Ok(()) => {}
        Err(BillaError::NoItemsDetected) => {
            bail!("No items were found on the receipt; try a clearer photo")
        }
        Err(e) => return Err(e.into()),
    }

    let session = orchestrator.snapshot().await;
    if let Some(data) = session.receipt().and_then(|r| r.data()) {
        render::receipt(data, !args.no_tax);
    }

    println!("🧮 Splitting...");
    orchestrator.compute_split(&args.instruction, !args.no_tax).await?;
    orchestrator.flush_background().await;

    render::settled(&orchestrator.snapshot().await);
    render::drain_events(&mut events);
    println!();
    println!("{}", orchestrator.share_summary().await);
    Ok(())
}
