use crate::context::AppContext;
use crate::render;
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum GroupsAction {
    /// List saved groups, newest first
    List,
    /// Delete a saved group
    Delete { group_id: String },
}

pub async fn run(ctx: &AppContext, action: GroupsAction) -> Result<()> {
    let service = ctx.group_service();
    match action {
        GroupsAction::List => {
            let groups = service.list().await?;
            if groups.is_empty() {
                println!("No saved groups");
            }
            for group in &groups {
                render::group_row(group);
            }
        }
        GroupsAction::Delete { group_id } => {
            let group = service.get(&group_id).await?;
            service.delete(&group.id).await?;
            println!("🗑️  Deleted group '{}'", group.group_name);
        }
    }
    Ok(())
}
