//! Public catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lumina_core::{
    CatalogQuery, Classification, ClassificationKind, Product, ProductId, SENTINEL_COLLECTION,
    SiteConfig, SortOrder,
};

use crate::filters;
use crate::middleware::OptionalEditor;
use crate::state::AppState;

/// How many products the detail page suggests.
const RELATED_LIMIT: usize = 4;

/// One `<option>` of the sort selector.
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Products of one collection.
pub struct SectionView {
    pub name: String,
    pub description: String,
    pub products: Vec<Product>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub site: SiteConfig,
    pub is_editor: bool,
    pub collections: Vec<Classification>,
    pub categories: Vec<Classification>,
    pub materials: Vec<Classification>,
    /// Selected collection, "Todas" when unfiltered.
    pub selected: String,
    pub selected_description: Option<String>,
    pub category: String,
    pub material: String,
    pub search: String,
    pub sort_options: Vec<SortOption>,
    pub sections: Vec<SectionView>,
    pub total: usize,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/product.html")]
pub struct ProductTemplate {
    pub site: SiteConfig,
    pub is_editor: bool,
    pub product: Product,
    pub collection: Option<Classification>,
    pub related: Vec<Product>,
}

/// "Producto no encontrado" page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/not_found.html")]
pub struct NotFoundTemplate {
    pub site: SiteConfig,
    pub is_editor: bool,
}

fn sort_options(current: SortOrder) -> Vec<SortOption> {
    SortOrder::ALL
        .iter()
        .map(|order| SortOption {
            value: order.as_str(),
            label: order.label(),
            selected: *order == current,
        })
        .collect()
}

/// Display the catalog, grouped by collection.
pub async fn index(
    State(state): State<AppState>,
    OptionalEditor(editor): OptionalEditor,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let catalog = state.shop().catalog().await;

    let sections: Vec<SectionView> = query
        .sections(&catalog)
        .into_iter()
        .map(|section| SectionView {
            name: section.collection.name.clone(),
            description: section.collection.description.clone(),
            products: section.products.into_iter().cloned().collect(),
        })
        .collect();
    let total = sections.iter().map(|s| s.products.len()).sum();

    let selected = query
        .selected_collection()
        .unwrap_or(SENTINEL_COLLECTION)
        .to_owned();
    let selected_description = catalog
        .collections
        .iter()
        .find(|c| c.name == selected && !c.is_sentinel())
        .map(|c| c.description.clone());

    CatalogTemplate {
        site: catalog.site_config.clone(),
        is_editor: editor.is_some(),
        collections: catalog.collections.clone(),
        categories: catalog.categories.clone(),
        materials: catalog.materials.clone(),
        selected,
        selected_description,
        category: query.category.clone().unwrap_or_default(),
        material: query.material.clone().unwrap_or_default(),
        search: query.search.clone().unwrap_or_default(),
        sort_options: sort_options(query.sort),
        sections,
        total,
    }
}

/// Display one product with a few others from the same collection.
pub async fn product_detail(
    State(state): State<AppState>,
    OptionalEditor(editor): OptionalEditor,
    Path(id): Path<String>,
) -> Response {
    let catalog = state.shop().catalog().await;
    let is_editor = editor.is_some();

    let Some(product) = ProductId::parse(&id).and_then(|id| catalog.product(&id)) else {
        return (
            StatusCode::NOT_FOUND,
            NotFoundTemplate {
                site: catalog.site_config.clone(),
                is_editor,
            },
        )
            .into_response();
    };

    let mut related: Vec<Product> = catalog
        .products_referencing(ClassificationKind::Collection, &product.collection)
        .filter(|p| p.id != product.id)
        .cloned()
        .collect();
    related.reverse();
    related.truncate(RELATED_LIMIT);
    let collection = catalog
        .collections
        .iter()
        .find(|c| c.name == product.collection)
        .cloned();

    ProductTemplate {
        site: catalog.site_config.clone(),
        is_editor,
        product: product.clone(),
        collection,
        related,
    }
    .into_response()
}

/// Fallback for unknown paths.
pub async fn not_found(
    State(state): State<AppState>,
    OptionalEditor(editor): OptionalEditor,
) -> Response {
    let site = state.shop().catalog().await.site_config.clone();
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            site,
            is_editor: editor.is_some(),
        },
    )
        .into_response()
}
