//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding; clients only ever see a short
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::shop::ShopError;
use crate::supabase::{AuthError, RemoteError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A shop store mutation failed.
    #[error("Shop error: {0}")]
    Shop(#[from] ShopError),

    /// Sign-in or session validation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Direct remote store call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Signed in, but not as the editor.
    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Remote(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(err, AuthError::MissingServiceRole | AuthError::Remote(_)),
            Self::Shop(err) => matches!(err, ShopError::Remote { .. }),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Remote(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shop(err) => match err {
                ShopError::Remote { .. } => StatusCode::BAD_GATEWAY,
                ShopError::Validation(_) | ShopError::Protected => StatusCode::BAD_REQUEST,
                ShopError::NotFound(_) => StatusCode::NOT_FOUND,
                ShopError::Duplicate(_) | ShopError::NoFallback { .. } => StatusCode::CONFLICT,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::MissingServiceRole | AuthError::Remote(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Text safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Remote(_) | Self::Internal(_) => "Error interno del servidor".to_string(),
            Self::Shop(err) => err.user_message(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Credenciales inválidas".to_string(),
                AuthError::UserAlreadyExists => "Ya existe una cuenta con ese correo".to_string(),
                AuthError::InvalidEmail(_) => "Correo electrónico no válido".to_string(),
                AuthError::MissingServiceRole | AuthError::Remote(_) => {
                    "Error de autenticación".to_string()
                }
            },
            Self::NotFound(what) => format!("No encontrado: {what}"),
            Self::Forbidden => "Acceso denegado".to_string(),
            Self::BadRequest(reason) => reason.clone(),
            Self::RateLimited => "Demasiadas solicitudes".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Associate later Sentry events with the signed-in editor.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_owned()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record an editor action as a Sentry breadcrumb.
///
/// ```rust,ignore
/// add_breadcrumb("editor", "Deleted product", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
