//! Collection, category and material panel handlers.
//!
//! The three lists share one set of routes keyed by the `{kind}` segment.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use lumina_core::{Classification, ClassificationKind};
use serde::Deserialize;

use super::{DASHBOARD_PATH, shop_error_redirect};
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireEditor;
use crate::routes::{redirect_with_error, redirect_with_success};
use crate::state::AppState;

/// New entry form.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Rename / describe form.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub original: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub name: String,
}

fn parse_kind(slug: &str) -> Result<ClassificationKind, AppError> {
    slug.parse()
        .map_err(|_| AppError::NotFound(format!("sección {slug}")))
}

/// Add an entry. A name that already exists is reported, not duplicated.
pub async fn add(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    Path(kind): Path<String>,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;
    let data = Classification::new(form.name, form.description);
    let name = data.name.trim().to_owned();

    let response = match state.shop().add_classification(kind, data).await {
        Ok(true) => {
            add_breadcrumb(
                "editor",
                "Added classification",
                Some(&[("kind", kind.slug()), ("name", name.as_str())]),
            );
            redirect_with_success(
                DASHBOARD_PATH,
                &format!("Se añadió \"{name}\" a {}.", kind.plural_label()),
            )
        }
        Ok(false) => redirect_with_error(
            DASHBOARD_PATH,
            &format!("\"{name}\" ya existe en {}.", kind.plural_label()),
        ),
        Err(e) => shop_error_redirect(DASHBOARD_PATH, &e),
    };
    Ok(response.into_response())
}

/// Rename an entry or change its description.
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    Path(kind): Path<String>,
    Form(form): Form<UpdateForm>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;
    let data = Classification::new(form.name, form.description);

    let response = match state
        .shop()
        .update_classification(kind, &form.original, data)
        .await
    {
        Ok(moved) => {
            add_breadcrumb(
                "editor",
                "Updated classification",
                Some(&[("kind", kind.slug()), ("name", form.original.as_str())]),
            );
            let message = if moved == 0 {
                format!("Se actualizó {} \"{}\".", kind.label(), form.original)
            } else {
                format!(
                    "Se actualizó {} \"{}\" y {moved} productos.",
                    kind.label(),
                    form.original
                )
            };
            redirect_with_success(DASHBOARD_PATH, &message)
        }
        Err(e) => shop_error_redirect(DASHBOARD_PATH, &e),
    };
    Ok(response.into_response())
}

/// Delete an entry; its products move to the first remaining entry.
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    Path(kind): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;

    let response = match state.shop().delete_classification(kind, &form.name).await {
        Ok(reassignment) => {
            add_breadcrumb(
                "editor",
                "Deleted classification",
                Some(&[("kind", kind.slug()), ("name", form.name.as_str())]),
            );
            let message = match reassignment.fallback {
                Some(to) if reassignment.moved > 0 => format!(
                    "Se eliminó \"{}\". {} productos se movieron a \"{to}\".",
                    form.name, reassignment.moved
                ),
                _ => format!("Se eliminó \"{}\".", form.name),
            };
            redirect_with_success(DASHBOARD_PATH, &message)
        }
        Err(e) => shop_error_redirect(DASHBOARD_PATH, &e),
    };
    Ok(response.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert!(matches!(
            parse_kind("materials"),
            Ok(ClassificationKind::Material)
        ));
        assert!(matches!(parse_kind("settings"), Err(AppError::NotFound(_))));
    }
}
