use super::prompt;
use crate::context::AppContext;
use anyhow::Result;
use billa_infrastructure::SignUpOutcome;

const PASSWORD_ENV: &str = "BILLA_PASSWORD";

async fn resolve_password(password: Option<String>) -> Result<String> {
    match password.or_else(|| std::env::var(PASSWORD_ENV).ok()) {
        Some(password) => Ok(password),
        None => prompt("Password: ").await,
    }
}

pub async fn login(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let auth = ctx.auth_service()?;
    let password = resolve_password(password).await?;
    let user = auth.sign_in_with_password(email, &password).await?;
    println!("✅ Signed in as {}", user.email.as_deref().unwrap_or(&user.id));
    Ok(())
}

pub async fn signup(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let auth = ctx.auth_service()?;
    let password = resolve_password(password).await?;
    match auth.sign_up(email, &password).await? {
        SignUpOutcome::SignedIn(user) => {
            println!("✅ Account created, signed in as {}", user.email.as_deref().unwrap_or(&user.id))
        }
        SignUpOutcome::ConfirmationRequired { email } => {
            println!("📧 Check {} for a confirmation link, then run `billa login`", email)
        }
    }
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth_service()?.sign_out().await?;
    println!("👋 Signed out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.auth().current_user().await {
        Some(user) => println!("{} ({})", user.email.as_deref().unwrap_or("-"), user.id),
        None => println!("Guest (history and groups are not saved)"),
    }
    Ok(())
}
