//! Editor account management.
//!
//! # Usage
//!
//! ```bash
//! lumina-cli editor create -e editor@example.com -p 'a long passphrase'
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL
//! - `SUPABASE_ANON_KEY` - Public API key
//! - `SUPABASE_SERVICE_ROLE_KEY` - Required to create accounts
//! - `LUMINA_EDITOR_PASSWORD` - Password when `-p` is not given
//! - `LUMINA_EDITOR_EMAIL` - Checked against the new account

use lumina_core::{Email, EmailError};
use lumina_storefront::config::{ConfigError, SupabaseConfig};
use lumina_storefront::supabase::{AuthClient, AuthError};
use secrecy::SecretString;
use thiserror::Error;

/// Shortest password accepted for the editor account.
const MIN_PASSWORD_LENGTH: usize = 12;

/// Errors that can occur during editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No password given: pass -p or set LUMINA_EDITOR_PASSWORD")]
    MissingPassword,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// User already exists.
    #[error("An account already exists with email: {0}")]
    UserExists(String),

    #[error("Auth service error: {0}")]
    Auth(AuthError),
}

impl From<AuthError> for EditorError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::InvalidEmail(e),
            other => Self::Auth(other),
        }
    }
}

/// Pick the password from the flag or the environment.
fn resolve_password(flag: Option<String>) -> Result<SecretString, EditorError> {
    let password = flag
        .or_else(|| std::env::var("LUMINA_EDITOR_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or(EditorError::MissingPassword)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(EditorError::WeakPassword);
    }
    Ok(SecretString::from(password))
}

/// Create a confirmed account.
///
/// # Returns
///
/// The id of the created account.
pub async fn create_user(email: &str, password: Option<String>) -> Result<String, EditorError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;
    let password = resolve_password(password)?;

    let config = SupabaseConfig::from_env()?;
    let client = AuthClient::new(&config)?;

    tracing::info!("Creating editor account: {}", email);
    let user = match client.create_user(&email, &password).await {
        Ok(user) => user,
        Err(AuthError::UserAlreadyExists) => return Err(EditorError::UserExists(email.to_string())),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Account created successfully! ID: {}", user.id);
    match std::env::var("LUMINA_EDITOR_EMAIL").ok().map(|v| Email::parse(&v)) {
        Some(Ok(editor)) if editor.matches(&email) => {}
        _ => tracing::warn!(
            "Note: LUMINA_EDITOR_EMAIL is not set to {}. The storefront will deny this account editor access.",
            email
        ),
    }

    Ok(user.id)
}
