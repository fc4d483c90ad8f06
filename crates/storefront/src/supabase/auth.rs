//! `GoTrue` email/password authentication.
//!
//! The storefront never stores passwords. Sign-in is delegated to the hosted
//! auth service and only the returned access token and email are kept in the
//! editor's session.

use async_trait::async_trait;
use lumina_core::{Email, EmailError};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use super::RemoteError;
use super::rest::service_url;
use crate::config::SupabaseConfig;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// User management needs the service-role key.
    #[error("SUPABASE_SERVICE_ROLE_KEY is required for this operation")]
    MissingServiceRole,

    /// Transport or unexpected API failure.
    #[error("auth service error: {0}")]
    Remote(#[from] RemoteError),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(RemoteError::Http(err))
    }
}

/// A signed-in identity as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// The user's email, if present and well-formed.
    #[must_use]
    pub fn email(&self) -> Option<Email> {
        self.email.as_deref().and_then(|e| Email::parse(e).ok())
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: SecretString,
    pub user: AuthUser,
}

/// Email/password session API.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &Email, password: &SecretString)
    -> Result<AuthSession, AuthError>;

    /// The user owning `access_token`, `None` if the token is no longer valid.
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Revoke `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// `GoTrue` client.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    auth_url: Url,
    anon_key: SecretString,
    service_role_key: Option<SecretString>,
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret()).map_err(|e| {
                RemoteError::Parse(format!("Invalid API key format: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            auth_url: service_url(&config.url, "auth/v1/")?,
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.auth_url
            .join(path)
            .map_err(|e| RemoteError::Parse(e.to_string()).into())
    }

    /// Create a confirmed account through the admin API.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingServiceRole`] when no service-role key is
    /// configured, [`AuthError::UserAlreadyExists`] if the email is taken.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_user(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthUser, AuthError> {
        let service_key = self
            .service_role_key
            .as_ref()
            .ok_or(AuthError::MissingServiceRole)?;

        let response = self
            .client
            .post(self.endpoint("admin/users")?)
            .header("apikey", service_key.expose_secret())
            .bearer_auth(service_key.expose_secret())
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
                "email_confirm": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::CONFLICT {
            return Err(AuthError::UserAlreadyExists);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()).into())
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.anon_key.expose_secret())
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        Ok(AuthSession {
            access_token: SecretString::from(token.access_token),
            user: token.user,
        })
    }

    #[instrument(skip_all)]
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let user = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(Some(user))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("logout")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An expired token is already signed out.
        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}
