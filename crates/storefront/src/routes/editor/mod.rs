//! Editor (admin) route handlers.
//!
//! Every handler takes [`RequireEditor`]. Mutations go through the shop
//! store and answer with a redirect carrying an `error` or `success` banner.

pub mod bulk;
pub mod classifications;
pub mod products;
pub mod reset;
pub mod settings;

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use lumina_core::catalog::product_field;
use lumina_core::{Catalog, ClassificationKind, Product, SiteConfig};
use tower_sessions::Session;

use super::{MessageQuery, redirect_with_error};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireEditor, clear_current_editor};
use crate::shop::ShopError;
use crate::state::AppState;

pub(crate) const DASHBOARD_PATH: &str = "/editor";

/// One classification entry with its usage.
pub struct EntryView {
    pub name: String,
    pub description: String,
    /// "Todas": cannot be renamed or deleted.
    pub protected: bool,
    pub product_count: usize,
}

/// One of the collection, category and material panels.
pub struct ClassificationPanel {
    pub slug: &'static str,
    /// Product column, used to name the bulk move target.
    pub field: &'static str,
    pub title: &'static str,
    pub entries: Vec<EntryView>,
}

impl ClassificationPanel {
    fn new(catalog: &Catalog, kind: ClassificationKind) -> Self {
        let entries = catalog
            .classifications(kind)
            .iter()
            .map(|entry| EntryView {
                name: entry.name.clone(),
                description: entry.description.clone(),
                protected: kind.has_sentinel() && entry.is_sentinel(),
                product_count: catalog
                    .products
                    .iter()
                    .filter(|p| product_field(p, kind) == entry.name)
                    .count(),
            })
            .collect();

        Self {
            slug: kind.slug(),
            field: kind.product_column(),
            title: kind.plural_label(),
            entries,
        }
    }

    /// Entries a product can be filed under.
    #[must_use]
    pub fn assignable(&self) -> Vec<&EntryView> {
        self.entries.iter().filter(|e| !e.protected).collect()
    }
}

/// Inventory tab template.
#[derive(Template, WebTemplate)]
#[template(path = "editor/dashboard.html")]
pub struct DashboardTemplate {
    pub site: SiteConfig,
    pub editor_email: String,
    pub error: Option<String>,
    pub success: Option<String>,
    /// Newest first.
    pub products: Vec<Product>,
    pub panels: Vec<ClassificationPanel>,
}

/// Inventory: product table, bulk actions and classification panels.
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireEditor(editor): RequireEditor,
    Query(query): Query<MessageQuery>,
) -> Response {
    match state.auth().current_user(&editor.access_token).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::info!(email = %editor.email, "Editor token expired");
            if let Err(e) = clear_current_editor(&session).await {
                tracing::error!(error = %e, "Failed to clear session");
            }
            return redirect_with_error(
                "/auth/login",
                "La sesión ha expirado. Inicia sesión de nuevo.",
            )
            .into_response();
        }
        Err(e) => tracing::warn!(error = %e, "Could not validate editor token"),
    }

    let catalog = state.shop().catalog().await;
    let mut products = catalog.products.clone();
    products.reverse();

    DashboardTemplate {
        site: catalog.site_config.clone(),
        editor_email: editor.email.to_string(),
        error: query.error,
        success: query.success,
        products,
        panels: ClassificationKind::ALL
            .iter()
            .map(|kind| ClassificationPanel::new(&catalog, *kind))
            .collect(),
    }
    .into_response()
}

/// Redirect back to the dashboard with the error's user-facing message.
pub(crate) fn shop_error_redirect(path: &str, err: &ShopError) -> Redirect {
    tracing::warn!(error = %err, "Editor action failed");
    redirect_with_error(path, &err.user_message())
}

/// Text fields and inlined image uploads of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, String>,
}

impl MultipartForm {
    /// Read every field. Non-empty file fields must be images and become
    /// `data:` URLs.
    ///
    /// # Errors
    ///
    /// [`AppError::BadRequest`] for a malformed body or a non-image upload.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if field.file_name().is_some() {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if bytes.is_empty() {
                    continue;
                }
                if !content_type.starts_with("image/") {
                    return Err(AppError::BadRequest(
                        "El archivo debe ser una imagen.".to_string(),
                    ));
                }
                form.files.insert(name, data_url(&content_type, &bytes));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.entry(name).or_default().push(value);
            }
        }

        Ok(form)
    }

    /// First value of a text field, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Every value of a repeated text field, in submission order.
    #[must_use]
    pub fn all(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    /// An uploaded image as a `data:` URL.
    #[must_use]
    pub fn image(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }
}

/// Inline an uploaded file.
#[must_use]
pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use lumina_core::defaults;

    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_panel_counts_and_protection() {
        let catalog = defaults::catalog();
        let panel = ClassificationPanel::new(&catalog, ClassificationKind::Collection);

        let todas = panel.entries.first().map(|e| (e.name.as_str(), e.protected));
        assert_eq!(todas, Some(("Todas", true)));
        let aurora = panel.entries.iter().find(|e| e.name == "Aurora");
        assert_eq!(aurora.map(|e| e.product_count), Some(4));
        assert_eq!(panel.assignable().len(), 3);
    }
}
