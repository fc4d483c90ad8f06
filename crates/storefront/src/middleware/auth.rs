//! Editor authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentEditor, session_keys};
use crate::routes::auth::AccessDeniedTemplate;
use crate::state::AppState;

/// Extractor that requires the signed-in editor.
///
/// Without a session the request is redirected to the login page. A session
/// for any other address gets the "Acceso denegado" page.
///
/// ```rust,ignore
/// async fn dashboard(RequireEditor(editor): RequireEditor) -> impl IntoResponse {
///     format!("Hola, {}", editor.email)
/// }
/// ```
pub struct RequireEditor(pub CurrentEditor);

/// Why an editor-only request was rejected.
#[derive(Debug)]
pub enum AuthRejection {
    RedirectToLogin,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, AccessDeniedTemplate).into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::RedirectToLogin)?;

        let editor: CurrentEditor = session
            .get(session_keys::CURRENT_EDITOR)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::RedirectToLogin)?;

        if !state.editor_email().matches(&editor.email) {
            tracing::warn!(email = %editor.email, "Non-editor session rejected");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(editor))
    }
}

/// Extractor that optionally gets the signed-in editor.
pub struct OptionalEditor(pub Option<CurrentEditor>);

impl<S> FromRequestParts<S> for OptionalEditor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let editor = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentEditor>(session_keys::CURRENT_EDITOR)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(editor))
    }
}

/// Store the signed-in editor in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_editor(
    session: &Session,
    editor: &CurrentEditor,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_EDITOR, editor).await
}

/// Remove the editor from the session (logout or expired token).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_editor(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentEditor>(session_keys::CURRENT_EDITOR)
        .await?;
    Ok(())
}
