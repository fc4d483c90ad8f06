//! "Restablecer" action: wipe everything back to the built-in catalog.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{DASHBOARD_PATH, shop_error_redirect};
use crate::error::add_breadcrumb;
use crate::middleware::RequireEditor;
use crate::routes::{redirect_with_error, redirect_with_success};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub confirm: String,
}

/// Reset products, classifications and settings to the defaults.
///
/// The form must carry `confirm=yes`.
pub async fn reset(
    State(state): State<AppState>,
    RequireEditor(editor): RequireEditor,
    Form(form): Form<ResetForm>,
) -> Response {
    if form.confirm != "yes" {
        return redirect_with_error(DASHBOARD_PATH, "Confirma el restablecimiento.")
            .into_response();
    }

    match state.shop().reset_to_default().await {
        Ok(()) => {
            tracing::warn!(email = %editor.email, "Catalog reset by editor");
            add_breadcrumb("editor", "Reset catalog", None);
            redirect_with_success(DASHBOARD_PATH, "Se restableció el catálogo.").into_response()
        }
        Err(e) => shop_error_redirect(DASHBOARD_PATH, &e).into_response(),
    }
}
