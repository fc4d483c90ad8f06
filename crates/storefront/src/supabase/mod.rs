//! Hosted data service client.
//!
//! The catalog lives in five tables (`products`, `collections`, `categories`,
//! `materials`, `site_config`) behind a `PostgREST` API, and editor sign-in
//! goes through the service's `GoTrue` auth API.
//!
//! # Architecture
//!
//! ```text
//! ShopStore ──▶ dyn RemoteStore ──┬─▶ RestClient   (reqwest, production)
//!                                 └─▶ MemoryRemote (tests, failure injection)
//!
//! routes::auth ──▶ dyn AuthProvider ──┬─▶ AuthClient (reqwest, production)
//!                                     └─▶ MemoryAuth (tests)
//! ```
//!
//! Rows coming back from the service are untrusted: they are decoded into
//! the structs in [`rows`] and converted into domain types with `TryFrom`,
//! skipping rows that cannot be converted.

pub mod auth;
pub mod memory;
pub mod rest;
pub mod rows;

use async_trait::async_trait;
use lumina_core::{Classification, ClassificationKind, Product, ProductId, SiteConfig};
use thiserror::Error;

pub use auth::{AuthClient, AuthError, AuthProvider, AuthSession, AuthUser};
pub use memory::{MemoryAuth, MemoryRemote, RemoteOp};
pub use rest::RestClient;

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A row could not be converted into a domain value.
    #[error("invalid {table} row: {reason}")]
    InvalidRow { table: &'static str, reason: String },

    /// Failed to parse a response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure injected by [`MemoryRemote`].
    #[error("injected failure on {0}")]
    Injected(String),
}

/// Table-scoped operations on the remote catalog.
///
/// Every write is a single remote call. Multi-step changes (rename cascades,
/// resets) are sequenced by the shop store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), RemoteError>;

    /// All products, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError>;

    /// Insert or replace products keyed by id.
    async fn upsert_products(&self, products: &[Product]) -> Result<(), RemoteError>;

    async fn delete_product(&self, id: &ProductId) -> Result<(), RemoteError>;

    async fn delete_all_products(&self) -> Result<(), RemoteError>;

    /// Rewrite the `kind` column of every product equal to `from` to `to`.
    async fn reassign_products(
        &self,
        kind: ClassificationKind,
        from: &str,
        to: &str,
    ) -> Result<(), RemoteError>;

    /// All entries of `kind`, ordered by name.
    async fn list_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<Vec<Classification>, RemoteError>;

    /// Insert one entry. Fails if the name already exists.
    async fn insert_classification(
        &self,
        kind: ClassificationKind,
        data: &Classification,
    ) -> Result<(), RemoteError>;

    /// Insert or replace entries keyed by name.
    async fn upsert_classifications(
        &self,
        kind: ClassificationKind,
        data: &[Classification],
    ) -> Result<(), RemoteError>;

    async fn update_description(
        &self,
        kind: ClassificationKind,
        name: &str,
        description: &str,
    ) -> Result<(), RemoteError>;

    async fn delete_classification(
        &self,
        kind: ClassificationKind,
        name: &str,
    ) -> Result<(), RemoteError>;

    async fn delete_all_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<(), RemoteError>;

    /// The singleton config row, `None` when it does not exist yet.
    async fn load_site_config(&self) -> Result<Option<SiteConfig>, RemoteError>;

    /// Upsert the singleton config row.
    async fn save_site_config(&self, config: &SiteConfig) -> Result<(), RemoteError>;
}
