//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Catalog (?collection=&category=&material=&q=&sort=)
//! GET  /products/{id}             - Product detail
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (remote store ping)
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action (rate limited)
//! POST /auth/logout               - Logout action
//!
//! # Editor (requires the editor session)
//! GET  /editor                    - Inventory: products and classifications
//! GET  /editor/products/new       - New product form
//! POST /editor/products           - Create product (multipart)
//! GET  /editor/products/{id}/edit - Edit product form
//! POST /editor/products/{id}      - Update product (multipart)
//! POST /editor/products/{id}/delete
//! POST /editor/products/bulk      - Bulk price / move / delete
//! POST /editor/{kind}             - Add collection, category or material
//! POST /editor/{kind}/update      - Rename or describe an entry
//! POST /editor/{kind}/delete      - Delete an entry, reassigning its products
//! GET  /editor/settings           - Site branding and social links
//! POST /editor/settings           - Save settings (multipart)
//! POST /editor/reset              - Reset everything to the defaults
//! ```
//!
//! Mutations answer with a redirect; failures and confirmations travel in
//! the `error` / `success` query parameters and are shown as a banner.

pub mod auth;
pub mod catalog;
pub mod editor;
pub mod health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Uploaded images are inlined, so editor forms need more than the default
/// body limit.
pub const EDITOR_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect to `path` with an error banner.
#[must_use]
pub fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message)))
}

/// Redirect to `path` with a confirmation banner.
#[must_use]
pub fn redirect_with_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?success={}", urlencoding::encode(message)))
}

/// Public pages.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/products/{id}", get(catalog::product_detail))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Sign-in routes; only the login action is rate limited.
pub fn auth_routes() -> Router<AppState> {
    let login = post(auth::login).layer(crate::middleware::auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page).merge(login))
        .route("/logout", post(auth::logout))
}

/// Editor routes. Every handler takes `RequireEditor`.
pub fn editor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(editor::dashboard))
        .route("/products", post(editor::products::create))
        .route("/products/new", get(editor::products::new_form))
        .route("/products/bulk", post(editor::bulk::apply))
        .route("/products/{id}", post(editor::products::update))
        .route("/products/{id}/edit", get(editor::products::edit_form))
        .route("/products/{id}/delete", post(editor::products::delete))
        .route(
            "/settings",
            get(editor::settings::page).post(editor::settings::update),
        )
        .route("/reset", post(editor::reset::reset))
        .route("/{kind}", post(editor::classifications::add))
        .route("/{kind}/update", post(editor::classifications::update))
        .route("/{kind}/delete", post(editor::classifications::delete))
        .layer(DefaultBodyLimit::max(EDITOR_BODY_LIMIT))
}

/// All application routes, without the outer middleware stack.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .nest("/auth", auth_routes())
        .nest("/editor", editor_routes())
        .fallback(catalog::not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_encodes_message() {
        let response = axum::response::IntoResponse::into_response(redirect_with_error(
            "/editor",
            "Error al guardar el producto.",
        ));
        let location = response.headers().get("location").map(|v| v.to_str().ok());
        assert_eq!(
            location,
            Some(Some("/editor?error=Error%20al%20guardar%20el%20producto."))
        );
    }
}
