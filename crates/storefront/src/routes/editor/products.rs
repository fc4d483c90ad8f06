//! Product create / edit / delete handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use lumina_core::{Catalog, ClassificationKind, ProductDraft, ProductId, SiteConfig};

use super::{DASHBOARD_PATH, MultipartForm, shop_error_redirect};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireEditor;
use crate::routes::{MessageQuery, redirect_with_error, redirect_with_success};
use crate::state::AppState;

/// A `<select>` option.
pub struct OptionView {
    pub name: String,
    pub selected: bool,
}

/// Product form template, shared by create and edit.
#[derive(Template, WebTemplate)]
#[template(path = "editor/product_form.html")]
pub struct ProductFormTemplate {
    pub site: SiteConfig,
    pub editor_email: String,
    pub error: Option<String>,
    pub title: &'static str,
    pub action: String,
    pub draft: ProductDraft,
    pub categories: Vec<OptionView>,
    pub collections: Vec<OptionView>,
    pub materials: Vec<OptionView>,
}

/// Options for one classification field; "Todas" is never offered.
fn options(catalog: &Catalog, kind: ClassificationKind, current: &str) -> Vec<OptionView> {
    catalog
        .classifications(kind)
        .iter()
        .filter(|c| !(kind.has_sentinel() && c.is_sentinel()))
        .map(|c| OptionView {
            name: c.name.clone(),
            selected: c.name == current,
        })
        .collect()
}

fn form_template(
    catalog: &Catalog,
    editor_email: String,
    error: Option<String>,
    title: &'static str,
    action: String,
    draft: ProductDraft,
) -> ProductFormTemplate {
    ProductFormTemplate {
        site: catalog.site_config.clone(),
        editor_email,
        error,
        title,
        action,
        categories: options(catalog, ClassificationKind::Category, &draft.category),
        collections: options(catalog, ClassificationKind::Collection, &draft.collection),
        materials: options(catalog, ClassificationKind::Material, &draft.material),
        draft,
    }
}

/// Build a draft from the submitted form. A new upload replaces the image.
fn draft_from(form: &MultipartForm) -> ProductDraft {
    ProductDraft {
        name: form.text("name"),
        category: form.text("category"),
        collection: form.text("collection"),
        price: form.text("price"),
        description: form.text("description"),
        material: form.text("material"),
        image_url: form
            .image("image")
            .map_or_else(|| form.text("image_url"), str::to_owned),
    }
}

/// Display the empty product form.
pub async fn new_form(
    State(state): State<AppState>,
    RequireEditor(editor): RequireEditor,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let catalog = state.shop().catalog().await;

    let first = |kind: ClassificationKind| {
        catalog
            .classifications(kind)
            .iter()
            .find(|c| !(kind.has_sentinel() && c.is_sentinel()))
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };
    let draft = ProductDraft {
        category: first(ClassificationKind::Category),
        collection: first(ClassificationKind::Collection),
        ..ProductDraft::default()
    };

    form_template(
        &catalog,
        editor.email.to_string(),
        query.error,
        "Nuevo Producto",
        "/editor/products".to_string(),
        draft,
    )
}

/// Create a product from the submitted form.
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = MultipartForm::read(multipart).await?;
    let id = ProductId::generate();

    let product = match draft_from(&form).validate(id) {
        Ok(product) => product,
        Err(e) => {
            return Ok(redirect_with_error(
                "/editor/products/new",
                &format!("No se pudo guardar: {e}."),
            )
            .into_response());
        }
    };

    match state.shop().add_product(product).await {
        Ok(product) => {
            add_breadcrumb(
                "editor",
                "Added product",
                Some(&[("product_id", product.id.as_str())]),
            );
            Ok(redirect_with_success(DASHBOARD_PATH, "Producto guardado.").into_response())
        }
        Err(e) => Ok(shop_error_redirect("/editor/products/new", &e).into_response()),
    }
}

/// Display the form filled with an existing product.
pub async fn edit_form(
    State(state): State<AppState>,
    RequireEditor(editor): RequireEditor,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let catalog = state.shop().catalog().await;
    let product = ProductId::parse(&id)
        .and_then(|id| catalog.product(&id))
        .ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;

    Ok(form_template(
        &catalog,
        editor.email.to_string(),
        query.error,
        "Editar Producto",
        format!("/editor/products/{}", product.id),
        ProductDraft::from(product),
    )
    .into_response())
}

/// Save changes to an existing product.
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let id = ProductId::parse(&id).ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;
    let form = MultipartForm::read(multipart).await?;
    let edit_path = format!("/editor/products/{id}/edit");

    let product = match draft_from(&form).validate(id) {
        Ok(product) => product,
        Err(e) => {
            return Ok(
                redirect_with_error(&edit_path, &format!("No se pudo guardar: {e}."))
                    .into_response(),
            );
        }
    };

    match state.shop().update_product(product).await {
        Ok(product) => {
            add_breadcrumb(
                "editor",
                "Updated product",
                Some(&[("product_id", product.id.as_str())]),
            );
            Ok(redirect_with_success(DASHBOARD_PATH, "Producto actualizado.").into_response())
        }
        Err(e) => Ok(shop_error_redirect(&edit_path, &e).into_response()),
    }
}

/// Delete a product.
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = ProductId::parse(&id).ok_or_else(|| AppError::NotFound(format!("producto {id}")))?;

    match state.shop().delete_product(&id).await {
        Ok(_) => {
            add_breadcrumb(
                "editor",
                "Deleted product",
                Some(&[("product_id", id.as_str())]),
            );
            Ok(redirect_with_success(DASHBOARD_PATH, "Producto eliminado.").into_response())
        }
        Err(e) => Ok(shop_error_redirect(DASHBOARD_PATH, &e).into_response()),
    }
}
