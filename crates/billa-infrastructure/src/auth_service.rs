//! Email/password authentication against the hosted auth API.
//!
//! A successful sign-in is persisted to `auth_session.json` so later runs
//! start signed in. `current_user()` treats a missing or expired session as
//! guest mode.

use crate::paths::BillaPaths;
use crate::rest_client::AccessToken;
use async_trait::async_trait;
use billa_core::config::StoreSettings;
use billa_core::user::{AuthProvider, AuthUser};
use billa_core::{BillaError, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// A signed-in session as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of a sign-up attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The backend issued a session right away.
    SignedIn(AuthUser),
    /// The account exists but the email address must be confirmed first.
    ConfirmationRequired { email: String },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    user: AuthUser,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct SupabaseAuthService {
    client: Client,
    base_url: String,
    anon_key: String,
    session_file: PathBuf,
    token: AccessToken,
    session: RwLock<Option<AuthSession>>,
}

impl SupabaseAuthService {
    /// Builds the service and restores the persisted session, if any.
    ///
    /// The token is in place before the first store request, so repositories
    /// sharing [`access_token`](Self::access_token) act as the signed-in user
    /// without anyone asking for the current user first.
    pub fn new(settings: &StoreSettings, paths: &BillaPaths) -> Result<Self> {
        let session_file = paths.auth_session_file()?;
        let session = match load_session_file(&session_file) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[Auth] Ignoring unreadable session file: {}", e);
                None
            }
        };
        let token = session
            .as_ref()
            .filter(|session| !session.is_expired(Utc::now()))
            .map(|session| session.access_token.clone());

        Ok(Self {
            client: Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key.clone(),
            session_file,
            token: AccessToken::new(token),
            session: RwLock::new(session),
        })
    }

    /// Token handle to share with the store repositories.
    pub fn access_token(&self) -> AccessToken {
        self.token.clone()
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| BillaError::transport("sign in", e.to_string()))?;
        let response = ensure_auth_success("sign in", response).await?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BillaError::upstream_format(format!("Unreadable sign-in response: {e}")))?;
        let user = token.user.clone();
        self.store_session(session_from(token, Utc::now())).await?;
        tracing::info!("[Auth] Signed in");
        Ok(user)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| BillaError::transport("sign up", e.to_string()))?;
        let response = ensure_auth_success("sign up", response).await?;

        let parsed: SignUpResponse = response
            .json()
            .await
            .map_err(|e| BillaError::upstream_format(format!("Unreadable sign-up response: {e}")))?;
        match parsed {
            SignUpResponse::Session(token) => {
                let user = token.user.clone();
                self.store_session(session_from(token, Utc::now())).await?;
                Ok(SignUpOutcome::SignedIn(user))
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationRequired {
                email: user.email.unwrap_or_else(|| email.to_string()),
            }),
        }
    }

    /// Signs out locally, and remotely when possible.
    ///
    /// The local session is always cleared even if the remote call fails.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(token) = self.token.get().await {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let result = self
                .client
                .post(url)
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!("[Auth] Remote sign-out failed: {}", e);
            }
        }

        *self.session.write().await = None;
        self.token.set(None).await;
        match tokio::fs::remove_file(&self.session_file).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!("[Auth] Signed out");
        Ok(())
    }

    /// Returns the live session, or `None` when signed out or expired.
    pub async fn session(&self) -> Option<AuthSession> {
        let session = self.session.read().await.clone()?;
        if session.is_expired(Utc::now()) {
            tracing::debug!("[Auth] Stored session expired");
            return None;
        }
        Some(session)
    }

    async fn store_session(&self, session: AuthSession) -> Result<()> {
        write_session_file(&self.session_file, &session).await?;
        self.token.set(Some(session.access_token.clone())).await;
        *self.session.write().await = Some(session);
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthService {
    async fn current_user(&self) -> Option<AuthUser> {
        self.session().await.map(|session| session.user)
    }
}

fn session_from(token: TokenResponse, now: DateTime<Utc>) -> AuthSession {
    AuthSession {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: now + Duration::seconds(token.expires_in),
        user: token.user,
    }
}

async fn ensure_auth_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AuthErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error_description.or(parsed.msg).or(parsed.message))
        .unwrap_or_else(|| status.to_string());

    if status.is_client_error() {
        Err(BillaError::unauthenticated(message))
    } else {
        Err(BillaError::http_status(operation, status.as_u16(), message))
    }
}

fn load_session_file(path: &Path) -> Result<Option<AuthSession>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_session_file(path: &Path, session: &AuthSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(session)?).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    Ok(())
}
