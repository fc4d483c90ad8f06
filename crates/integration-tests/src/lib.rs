//! Integration tests for the Lumina shop store.
//!
//! The store is driven through its public API against a [`MemoryRemote`],
//! whose failure injection stands in for an unreachable or failing data
//! service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lumina-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `load` - Initial load, seeding and fallbacks
//! - `products` - Product add / update / delete
//! - `classifications` - Rename and delete cascades, "Todas" protection
//! - `rollback` - Failed remote calls leave memory untouched
//! - `bulk` - Per-item bulk outcomes

use std::path::Path;
use std::sync::Arc;

use lumina_core::{Catalog, Product, ProductId, defaults};
use lumina_storefront::shop::{LoadSource, ShopStore};
use lumina_storefront::snapshot::FileSnapshotStore;
use lumina_storefront::supabase::{MemoryRemote, RemoteStore};
use tempfile::TempDir;

/// A loaded store, its remote and the snapshot directory.
pub struct TestContext {
    pub store: ShopStore,
    pub remote: Arc<MemoryRemote>,
    pub source: LoadSource,
    pub dir: TempDir,
}

impl TestContext {
    /// Load a store from a remote already holding `catalog`.
    ///
    /// # Panics
    ///
    /// If no temporary directory can be created.
    pub async fn with_catalog(catalog: &Catalog) -> Self {
        Self::with_remote(MemoryRemote::with_catalog(catalog)).await
    }

    /// Load a store from a remote holding the default catalog.
    pub async fn seeded() -> Self {
        Self::with_catalog(&defaults::catalog()).await
    }

    /// Load a store from `remote`; the operation log starts empty afterwards.
    ///
    /// # Panics
    ///
    /// If no temporary directory can be created.
    pub async fn with_remote(remote: MemoryRemote) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        Self::load_in(Arc::new(remote), dir).await
    }

    /// Load a store from `remote` using snapshots in `dir`.
    pub async fn load_in(remote: Arc<MemoryRemote>, dir: TempDir) -> Self {
        let (store, source) = ShopStore::load(
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            FileSnapshotStore::new(dir.path()),
        )
        .await;
        remote.clear_log();
        Self {
            store,
            remote,
            source,
            dir,
        }
    }

    #[must_use]
    pub fn snapshot_dir(&self) -> &Path {
        self.dir.path()
    }
}

/// The product the behaviour scenarios are written around.
///
/// # Panics
///
/// If `id` is blank.
#[must_use]
pub fn ring(id: &str) -> Product {
    Product {
        id: ProductId::parse(id).expect("non-blank id"),
        name: "Ring".to_string(),
        category: "Anillos".to_string(),
        collection: "Aurora".to_string(),
        price: "10.00 €".to_string(),
        description: String::new(),
        material: "Gold".to_string(),
        image_url: String::new(),
    }
}

/// The default catalog with a "Gold" material, so [`ring`] validates.
///
/// # Panics
///
/// If the defaults already contain "Gold".
#[must_use]
pub fn catalog_with_gold() -> Catalog {
    let mut catalog = defaults::catalog();
    let added = catalog.add_classification(
        lumina_core::ClassificationKind::Material,
        lumina_core::Classification::new("Gold", ""),
    );
    assert!(added, "Gold is not a default material");
    catalog
}

/// Parse ids for bulk calls, skipping blanks.
#[must_use]
pub fn ids(raw: &[&str]) -> Vec<ProductId> {
    raw.iter().filter_map(|id| ProductId::parse(id)).collect()
}
