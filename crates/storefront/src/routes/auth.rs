//! Editor sign-in route handlers.
//!
//! Credentials are checked by the auth service. Any account may sign in, but
//! only the configured editor address gets past `RequireEditor`; everyone
//! else sees the access denied page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use lumina_core::Email;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;

use super::{MessageQuery, redirect_with_error};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalEditor, clear_current_editor, set_current_editor};
use crate::models::CurrentEditor;
use crate::state::AppState;
use crate::supabase::AuthError;

const LOGIN_PATH: &str = "/auth/login";
const GENERIC_LOGIN_ERROR: &str = "Error al iniciar sesión. Por favor, intenta de nuevo.";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Shown to a signed-in account that is not the editor.
#[derive(Template, WebTemplate)]
#[template(path = "auth/access_denied.html")]
pub struct AccessDeniedTemplate;

/// Display the login page, or go straight to the editor when signed in.
pub async fn login_page(
    OptionalEditor(editor): OptionalEditor,
    Query(query): Query<MessageQuery>,
) -> Response {
    if editor.is_some() {
        return Redirect::to("/editor").into_response();
    }
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return redirect_with_error(LOGIN_PATH, "Correo electrónico no válido.").into_response();
    };
    let password = SecretString::from(form.password);

    match state.auth().sign_in(&email, &password).await {
        Ok(signed_in) => {
            let editor = CurrentEditor {
                user_id: signed_in.user.id.clone(),
                email: signed_in.user.email().unwrap_or(email),
                access_token: signed_in.access_token.expose_secret().to_owned(),
            };

            if let Err(e) = set_current_editor(&session, &editor).await {
                tracing::error!(error = %e, "Failed to set session");
                return redirect_with_error(LOGIN_PATH, GENERIC_LOGIN_ERROR).into_response();
            }

            set_sentry_user(&editor.user_id, Some(editor.email.as_str()));
            add_breadcrumb("auth", "Signed in", None);
            tracing::info!(user_id = %editor.user_id, "Signed in");
            Redirect::to("/editor").into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            redirect_with_error(LOGIN_PATH, "Credenciales de inicio de sesión no válidas.")
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            redirect_with_error(LOGIN_PATH, GENERIC_LOGIN_ERROR).into_response()
        }
    }
}

/// Sign out: revoke the token (best effort) and clear the session.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalEditor(editor): OptionalEditor,
) -> impl IntoResponse {
    if let Some(editor) = editor {
        if let Err(e) = state.auth().sign_out(&editor.access_token).await {
            tracing::warn!(error = %e, "Remote sign-out failed");
        }
    }

    if let Err(e) = clear_current_editor(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    Redirect::to("/")
}
