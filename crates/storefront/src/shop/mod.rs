//! Shop state store.
//!
//! The in-memory catalog every page renders from, plus the mutation API the
//! editor uses. Each mutation follows the same protocol:
//!
//! 1. Take the write gate (mutations never interleave).
//! 2. Clone the whole catalog and apply the change under the write lock, so
//!    readers see either the old state or the complete new one.
//! 3. Run the remote calls.
//! 4. On failure put the clone back verbatim and return [`ShopError::Remote`].
//!
//! Settled state is mirrored to the local snapshot store.

mod bulk;
pub mod error;

use std::future::Future;
use std::slice;
use std::sync::Arc;

use lumina_core::catalog::product_field;
use lumina_core::{
    Catalog, Classification, ClassificationKind, Product, ProductId, SENTINEL_COLLECTION,
    SiteConfig, ValidationError, defaults,
};
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::instrument;

pub use bulk::BulkOutcome;
pub use error::{Action, ShopError};

use crate::snapshot::FileSnapshotStore;
use crate::supabase::{RemoteError, RemoteStore};

/// Where the catalog came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    /// The remote store was unreachable; the last local snapshot was used.
    Snapshot,
    /// Neither the remote store nor a snapshot was available.
    Defaults,
}

/// What happened to the products of a deleted classification entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub moved: usize,
    pub fallback: Option<String>,
}

pub struct ShopStore {
    catalog: RwLock<Catalog>,
    write_gate: Mutex<()>,
    remote: Arc<dyn RemoteStore>,
    snapshots: FileSnapshotStore,
}

impl ShopStore {
    /// Load the catalog and build the store.
    ///
    /// Tries the remote store first, seeding empty tables with the defaults.
    /// When the remote store cannot be read the local snapshot is used, and
    /// the built-in defaults when there is no snapshot either. Never fails.
    #[instrument(skip_all)]
    pub async fn load(
        remote: Arc<dyn RemoteStore>,
        snapshots: FileSnapshotStore,
    ) -> (Self, LoadSource) {
        let (mut catalog, source) = match fetch_or_seed(remote.as_ref()).await {
            Ok(catalog) => (catalog, LoadSource::Remote),
            Err(e) => {
                tracing::warn!(error = %e, "Remote store unavailable, falling back to local snapshot");
                let snapshot = snapshots.load().await;
                if snapshot.is_empty() {
                    (defaults::catalog(), LoadSource::Defaults)
                } else {
                    (snapshot.into_catalog(), LoadSource::Snapshot)
                }
            }
        };

        let adopted = catalog.adopt_dangling();
        if !adopted.is_empty() {
            tracing::warn!(
                count = adopted.len(),
                "Products referenced missing classifications; added them"
            );
            if source == LoadSource::Remote {
                for (kind, entry) in &adopted {
                    if let Err(e) = remote
                        .upsert_classifications(*kind, slice::from_ref(entry))
                        .await
                    {
                        tracing::warn!(%kind, name = %entry.name, error = %e, "Failed to store repaired entry");
                    }
                }
            }
        }

        tracing::info!(
            ?source,
            products = catalog.products.len(),
            collections = catalog.collections.len(),
            categories = catalog.categories.len(),
            materials = catalog.materials.len(),
            "Catalog loaded"
        );

        let store = Self {
            catalog: RwLock::new(catalog),
            write_gate: Mutex::new(()),
            remote,
            snapshots,
        };
        if source == LoadSource::Remote {
            store.write_snapshot().await;
        }
        (store, source)
    }

    /// Read access to the current catalog.
    pub async fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().await
    }

    /// A copy of the current catalog.
    pub async fn current(&self) -> Catalog {
        self.catalog.read().await.clone()
    }

    #[must_use]
    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    /// Mirror the current catalog to the local snapshot store.
    pub async fn write_snapshot(&self) {
        let catalog = self.current().await;
        if let Err(e) = self.snapshots.save(&catalog).await {
            tracing::warn!(error = %e, "Failed to write local snapshot");
        }
    }

    /// Apply `apply` optimistically, then run `persist`; roll back if either
    /// fails.
    async fn optimistic<T, A, P, F>(&self, action: Action, apply: A, persist: P) -> Result<T, ShopError>
    where
        T: Clone,
        A: FnOnce(&mut Catalog) -> Result<T, ShopError>,
        P: FnOnce(Arc<dyn RemoteStore>, T) -> F,
        F: Future<Output = Result<(), RemoteError>>,
    {
        let _gate = self.write_gate.lock().await;
        self.optimistic_gated(action, apply, persist).await
    }

    /// [`Self::optimistic`] for a caller already holding the write gate.
    async fn optimistic_gated<T, A, P, F>(
        &self,
        action: Action,
        apply: A,
        persist: P,
    ) -> Result<T, ShopError>
    where
        T: Clone,
        A: FnOnce(&mut Catalog) -> Result<T, ShopError>,
        P: FnOnce(Arc<dyn RemoteStore>, T) -> F,
        F: Future<Output = Result<(), RemoteError>>,
    {
        let (before, value) = {
            let mut catalog = self.catalog.write().await;
            let before = catalog.clone();
            match apply(&mut catalog) {
                Ok(value) => (before, value),
                Err(e) => {
                    *catalog = before;
                    return Err(e);
                }
            }
        };

        if let Err(source) = persist(Arc::clone(&self.remote), value.clone()).await {
            *self.catalog.write().await = before;
            tracing::warn!(?action, error = %source, "Remote write failed, change rolled back");
            return Err(ShopError::Remote { action, source });
        }

        self.write_snapshot().await;
        Ok(value)
    }

    /// Add a new product. The caller supplies a unique id.
    ///
    /// # Errors
    ///
    /// Validation errors for blank required fields or unknown
    /// classification references, [`ShopError::Duplicate`] for a taken id,
    /// [`ShopError::Remote`] when the remote write fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_product(&self, product: Product) -> Result<Product, ShopError> {
        self.optimistic(
            Action::AddProduct,
            move |catalog| {
                check_product(catalog, &product)?;
                catalog.insert_product(product.clone())?;
                Ok(product)
            },
            |remote, product| async move { remote.upsert_products(slice::from_ref(&product)).await },
        )
        .await
    }

    /// Replace an existing product, matched by id.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`] when the id does not exist (no remote call is
    /// made), otherwise as [`Self::add_product`].
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update_product(&self, product: Product) -> Result<Product, ShopError> {
        self.optimistic(
            Action::UpdateProduct,
            move |catalog| {
                if catalog.product(&product.id).is_none() {
                    return Err(ShopError::product_not_found(&product.id));
                }
                check_product(catalog, &product)?;
                catalog.replace_product(product.clone())?;
                Ok(product)
            },
            |remote, product| async move { remote.upsert_products(slice::from_ref(&product)).await },
        )
        .await
    }

    /// Delete a product, returning it.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`] or [`ShopError::Remote`].
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Product, ShopError> {
        self.optimistic(
            Action::DeleteProduct,
            |catalog| Ok(catalog.remove_product(id)?),
            |remote, product| async move { remote.delete_product(&product.id).await },
        )
        .await
    }

    /// Add a classification entry.
    ///
    /// Returns `false` without contacting the remote store when the name
    /// already exists.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] for a blank name, or
    /// [`ShopError::Remote`].
    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn add_classification(
        &self,
        kind: ClassificationKind,
        data: Classification,
    ) -> Result<bool, ShopError> {
        let data = data
            .normalized()
            .ok_or(ValidationError::MissingField("nombre"))?;
        let entry = data.clone();

        self.optimistic(
            Action::AddClassification(kind),
            move |catalog| Ok(catalog.add_classification(kind, data)),
            move |remote, added| async move {
                if added {
                    remote.insert_classification(kind, &entry).await
                } else {
                    Ok(())
                }
            },
        )
        .await
    }

    /// Replace the entry named `original`.
    ///
    /// A rename rewrites every product referencing `original`; in memory this
    /// happens in one step, remotely as upsert, reassign, delete. Returns the
    /// number of rewritten products.
    ///
    /// # Errors
    ///
    /// [`ShopError::Protected`] when renaming "Todas", [`ShopError::NotFound`],
    /// [`ShopError::Duplicate`], a blank name, or [`ShopError::Remote`].
    #[instrument(skip(self, data), fields(new_name = %data.name))]
    pub async fn update_classification(
        &self,
        kind: ClassificationKind,
        original: &str,
        data: Classification,
    ) -> Result<usize, ShopError> {
        let data = data
            .normalized()
            .ok_or(ValidationError::MissingField("nombre"))?;
        let entry = data.clone();
        let original_name = original.to_owned();

        self.optimistic(
            Action::UpdateClassification(kind),
            move |catalog| Ok(catalog.replace_classification(kind, original, data)?),
            move |remote, _| async move {
                if entry.name == original_name {
                    return remote
                        .update_description(kind, &original_name, &entry.description)
                        .await;
                }
                // The new entry may already exist remotely from an earlier
                // rename that failed halfway.
                remote
                    .upsert_classifications(kind, slice::from_ref(&entry))
                    .await?;
                remote
                    .reassign_products(kind, &original_name, &entry.name)
                    .await?;
                remote.delete_classification(kind, &original_name).await
            },
        )
        .await
    }

    /// Delete the entry named `name`, moving its products to the first other
    /// entry in list order (never "Todas").
    ///
    /// # Errors
    ///
    /// [`ShopError::Protected`] for "Todas", [`ShopError::NotFound`],
    /// [`ShopError::NoFallback`] when products would be left without an
    /// entry, or [`ShopError::Remote`].
    #[instrument(skip(self))]
    pub async fn delete_classification(
        &self,
        kind: ClassificationKind,
        name: &str,
    ) -> Result<Reassignment, ShopError> {
        let deleted = name.to_owned();

        self.optimistic(
            Action::DeleteClassification(kind),
            |catalog| {
                let fallback = catalog.fallback_for(kind, name).map(str::to_owned);
                let moved = catalog.remove_classification(kind, name, fallback.as_deref())?;
                Ok(Reassignment { moved, fallback })
            },
            move |remote, reassignment| async move {
                let target = reassignment
                    .fallback
                    .as_deref()
                    .filter(|_| reassignment.moved > 0);
                if let Some(to) = target {
                    remote.reassign_products(kind, &deleted, to).await?;
                }
                remote.delete_classification(kind, &deleted).await
            },
        )
        .await
    }

    /// # Errors
    ///
    /// See [`Self::add_classification`].
    pub async fn add_collection(&self, data: Classification) -> Result<bool, ShopError> {
        self.add_classification(ClassificationKind::Collection, data)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::add_classification`].
    pub async fn add_category(&self, data: Classification) -> Result<bool, ShopError> {
        self.add_classification(ClassificationKind::Category, data)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::add_classification`].
    pub async fn add_material(&self, data: Classification) -> Result<bool, ShopError> {
        self.add_classification(ClassificationKind::Material, data)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::update_classification`].
    pub async fn update_collection(
        &self,
        original: &str,
        data: Classification,
    ) -> Result<usize, ShopError> {
        self.update_classification(ClassificationKind::Collection, original, data)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::update_classification`].
    pub async fn update_category(
        &self,
        original: &str,
        data: Classification,
    ) -> Result<usize, ShopError> {
        self.update_classification(ClassificationKind::Category, original, data)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::update_classification`].
    pub async fn update_material(
        &self,
        original: &str,
        data: Classification,
    ) -> Result<usize, ShopError> {
        self.update_classification(ClassificationKind::Material, original, data)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::delete_classification`].
    pub async fn delete_collection(&self, name: &str) -> Result<Reassignment, ShopError> {
        self.delete_classification(ClassificationKind::Collection, name)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::delete_classification`].
    pub async fn delete_category(&self, name: &str) -> Result<Reassignment, ShopError> {
        self.delete_classification(ClassificationKind::Category, name)
            .await
    }

    /// # Errors
    ///
    /// See [`Self::delete_classification`].
    pub async fn delete_material(&self, name: &str) -> Result<Reassignment, ShopError> {
        self.delete_classification(ClassificationKind::Material, name)
            .await
    }

    /// Replace the site configuration.
    ///
    /// # Errors
    ///
    /// [`ShopError::Remote`] when the remote write fails.
    #[instrument(skip_all)]
    pub async fn update_site_config(&self, config: SiteConfig) -> Result<SiteConfig, ShopError> {
        let config = config.normalized();
        self.optimistic(
            Action::UpdateSiteConfig,
            move |catalog| {
                catalog.site_config = config.clone();
                Ok(config)
            },
            |remote, config| async move { remote.save_site_config(&config).await },
        )
        .await
    }

    /// Wipe the remote catalog, reseed it with the defaults and reload.
    ///
    /// # Errors
    ///
    /// [`ShopError::Remote`] when any reseed call fails; the in-memory catalog
    /// is restored but the remote tables may be partially wiped.
    #[instrument(skip(self))]
    pub async fn reset_to_default(&self) -> Result<(), ShopError> {
        let _gate = self.write_gate.lock().await;
        self.optimistic_gated(
            Action::Reset,
            |catalog| {
                *catalog = defaults::catalog();
                Ok(())
            },
            |remote, ()| async move { reseed(remote.as_ref()).await },
        )
        .await?;

        match fetch_or_seed(self.remote.as_ref()).await {
            Ok(catalog) => {
                *self.catalog.write().await = catalog;
                self.write_snapshot().await;
            }
            Err(e) => tracing::warn!(error = %e, "Reload after reset failed, keeping defaults"),
        }
        tracing::info!("Catalog reset to defaults");
        Ok(())
    }
}

/// Reject a product with blank required fields, filed under "Todas", or
/// referencing a classification that does not exist. Only `material` may be
/// blank.
fn check_product(catalog: &Catalog, product: &Product) -> Result<(), ValidationError> {
    let required = [
        (product.name.as_str(), "nombre"),
        (product.price.as_str(), "precio"),
        (product.category.as_str(), "categoría"),
        (product.collection.as_str(), "colección"),
    ];
    if let Some((_, field)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
        return Err(ValidationError::MissingField(*field));
    }
    if product.collection == SENTINEL_COLLECTION {
        return Err(ValidationError::SentinelCollection);
    }
    for kind in ClassificationKind::ALL {
        let value = product_field(product, kind);
        if !value.is_empty() && !catalog.contains(kind, value) {
            return Err(ValidationError::UnknownReference {
                kind,
                value: value.to_owned(),
            });
        }
    }
    Ok(())
}

/// Read the whole remote catalog, seeding empty tables with the defaults.
///
/// Seed write failures are logged; the defaults are still returned for that
/// table.
///
/// # Errors
///
/// Returns the first read error.
pub async fn fetch_or_seed(remote: &dyn RemoteStore) -> Result<Catalog, RemoteError> {
    let collections = fetch_classifications(remote, ClassificationKind::Collection).await?;
    let categories = fetch_classifications(remote, ClassificationKind::Category).await?;
    let materials = fetch_classifications(remote, ClassificationKind::Material).await?;

    let mut products = remote.list_products().await?;
    if products.is_empty() {
        products = defaults::products();
        log_seed(remote.upsert_products(&products).await, "products");
    } else {
        products.reverse();
    }

    let site_config = if let Some(config) = remote.load_site_config().await? {
        config
    } else {
        let config = defaults::site_config();
        log_seed(remote.save_site_config(&config).await, "site_config");
        config
    };

    let mut catalog = Catalog {
        products,
        collections,
        categories,
        materials,
        site_config,
    };
    catalog.sort_all();
    Ok(catalog)
}

async fn fetch_classifications(
    remote: &dyn RemoteStore,
    kind: ClassificationKind,
) -> Result<Vec<Classification>, RemoteError> {
    let list = remote.list_classifications(kind).await?;
    if !list.is_empty() {
        return Ok(list);
    }
    let seed = defaults::classifications(kind);
    log_seed(
        remote.upsert_classifications(kind, &seed).await,
        kind.table(),
    );
    Ok(seed)
}

fn log_seed(result: Result<(), RemoteError>, table: &str) {
    match result {
        Ok(()) => tracing::info!(table, "Seeded empty table with defaults"),
        Err(e) => tracing::warn!(table, error = %e, "Failed to seed table"),
    }
}

/// Delete every product and classification entry and write the defaults.
///
/// # Errors
///
/// Stops at the first failing call.
pub async fn reseed(remote: &dyn RemoteStore) -> Result<(), RemoteError> {
    remote.delete_all_products().await?;
    for kind in ClassificationKind::ALL {
        remote.delete_all_classifications(kind).await?;
    }
    for kind in ClassificationKind::ALL {
        remote
            .upsert_classifications(kind, &defaults::classifications(kind))
            .await?;
    }
    remote.upsert_products(&defaults::products()).await?;
    remote.save_site_config(&defaults::site_config()).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::supabase::{MemoryRemote, RemoteOp};

    async fn store_with(remote: &Arc<MemoryRemote>) -> (ShopStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let remote_dyn: Arc<dyn RemoteStore> = remote.clone();
        let (store, source) = ShopStore::load(remote_dyn, FileSnapshotStore::new(dir.path())).await;
        assert_eq!(source, LoadSource::Remote);
        remote.clear_log();
        (store, dir)
    }

    async fn seeded() -> (ShopStore, Arc<MemoryRemote>, tempfile::TempDir) {
        let remote = Arc::new(MemoryRemote::with_catalog(&defaults::catalog()));
        let (store, dir) = store_with(&remote).await;
        (store, remote, dir)
    }

    fn ring(id: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: "Ring".to_string(),
            category: "Anillos".to_string(),
            collection: "Aurora".to_string(),
            price: "10.00 €".to_string(),
            description: String::new(),
            material: "Acetato y metal".to_string(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_load_from_remote_preserves_catalog() {
        let (store, _remote, _dir) = seeded().await;
        assert_eq!(store.current().await, defaults::catalog());
    }

    #[tokio::test]
    async fn test_load_empty_remote_seeds_defaults() {
        let remote = Arc::new(MemoryRemote::new());
        let (store, _dir) = store_with(&remote).await;

        assert_eq!(store.current().await, defaults::catalog());
        assert_eq!(remote.products(), defaults::products());
        assert_eq!(
            remote.classifications(ClassificationKind::Collection),
            defaults::collections()
        );
        assert_eq!(remote.site_config(), Some(defaults::site_config()));
    }

    #[tokio::test]
    async fn test_load_offline_without_snapshot_uses_defaults() {
        let remote = Arc::new(MemoryRemote::new());
        remote.go_offline();
        let dir = tempfile::tempdir().unwrap();

        let (store, source) = ShopStore::load(remote, FileSnapshotStore::new(dir.path())).await;
        assert_eq!(source, LoadSource::Defaults);
        assert_eq!(store.current().await, defaults::catalog());
    }

    #[tokio::test]
    async fn test_load_offline_uses_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut saved = defaults::catalog();
        saved.site_config.site_name = "Lumina".to_string();
        FileSnapshotStore::new(dir.path()).save(&saved).await.unwrap();

        let remote = Arc::new(MemoryRemote::new());
        remote.go_offline();
        let (store, source) = ShopStore::load(remote, FileSnapshotStore::new(dir.path())).await;

        assert_eq!(source, LoadSource::Snapshot);
        assert_eq!(store.current().await.site_config.site_name, "Lumina");
    }

    #[tokio::test]
    async fn test_load_repairs_dangling_references() {
        let mut catalog = defaults::catalog();
        catalog.products[0].material = "Titanio".to_string();
        let remote = Arc::new(MemoryRemote::with_catalog(&catalog));
        let (store, _dir) = store_with(&remote).await;

        assert!(store.catalog().await.contains(ClassificationKind::Material, "Titanio"));
        assert!(
            remote
                .classifications(ClassificationKind::Material)
                .iter()
                .any(|m| m.name == "Titanio")
        );
    }

    #[tokio::test]
    async fn test_add_product_appends_and_persists() {
        let (store, remote, _dir) = seeded().await;
        store.add_product(ring("99")).await.unwrap();

        let catalog = store.current().await;
        assert_eq!(catalog.products.last().unwrap().id.as_str(), "99");
        assert_eq!(
            remote.writes(),
            vec![RemoteOp::UpsertProduct(ProductId::parse("99").unwrap())]
        );
    }

    #[tokio::test]
    async fn test_add_product_rejects_unknown_reference_without_remote_call() {
        let (store, remote, _dir) = seeded().await;
        let mut product = ring("99");
        product.category = "Broches".to_string();

        let err = store.add_product(product).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Validation(ValidationError::UnknownReference { .. })
        ));
        assert!(remote.ops().is_empty());
        assert_eq!(store.current().await, defaults::catalog());
    }

    #[tokio::test]
    async fn test_add_product_requires_collection_and_category() {
        let (store, remote, _dir) = seeded().await;

        let mut product = ring("99");
        product.collection = String::new();
        let err = store.add_product(product).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Validation(ValidationError::MissingField("colección"))
        ));

        let mut product = ring("99");
        product.category = "  ".to_string();
        let err = store.add_product(product).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Validation(ValidationError::MissingField("categoría"))
        ));

        let mut product = ring("99");
        product.material = String::new();
        store.add_product(product).await.unwrap();

        let catalog = store.current().await;
        assert!(catalog.dangling_references().is_empty());
        assert_eq!(remote.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_add_product_rejects_sentinel_collection() {
        let (store, _remote, _dir) = seeded().await;
        let mut product = ring("99");
        product.collection = SENTINEL_COLLECTION.to_string();

        let err = store.add_product(product).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Validation(ValidationError::SentinelCollection)
        ));
    }

    #[tokio::test]
    async fn test_add_product_remote_failure_rolls_back() {
        let (store, remote, _dir) = seeded().await;
        remote.go_offline();

        let err = store.add_product(ring("99")).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::Remote {
                action: Action::AddProduct,
                ..
            }
        ));
        assert_eq!(store.current().await, defaults::catalog());
    }

    #[tokio::test]
    async fn test_update_missing_product_makes_no_remote_call() {
        let (store, remote, _dir) = seeded().await;
        let err = store.update_product(ring("404")).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
        assert!(remote.ops().is_empty());
    }

    #[tokio::test]
    async fn test_update_product_replaces_in_place() {
        let (store, _remote, _dir) = seeded().await;
        let mut product = ring("1");
        product.name = "Gargantilla Lunar".to_string();
        store.update_product(product).await.unwrap();

        let catalog = store.current().await;
        assert_eq!(catalog.products[0].name, "Gargantilla Lunar");
        assert_eq!(catalog.products.len(), 11);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let (store, remote, _dir) = seeded().await;
        let id = ProductId::parse("3").unwrap();
        store.delete_product(&id).await.unwrap();

        assert!(store.catalog().await.product(&id).is_none());
        assert!(remote.products().iter().all(|p| p.id != id));
    }

    #[tokio::test]
    async fn test_rename_collection_cascades() {
        let (store, remote, _dir) = seeded().await;
        let moved = store
            .update_collection("Aurora", Classification::new("Amanecer", "..."))
            .await
            .unwrap();

        assert_eq!(moved, 4);
        let catalog = store.current().await;
        assert!(catalog.products.iter().all(|p| p.collection != "Aurora"));
        assert_eq!(
            catalog.product(&ProductId::parse("1").unwrap()).unwrap().collection,
            "Amanecer"
        );
        assert!(catalog.contains(ClassificationKind::Collection, "Amanecer"));
        assert!(!catalog.contains(ClassificationKind::Collection, "Aurora"));
        assert!(remote.products().iter().all(|p| p.collection != "Aurora"));
        assert_eq!(
            remote.writes(),
            vec![
                RemoteOp::UpsertClassifications(ClassificationKind::Collection),
                RemoteOp::ReassignProducts {
                    kind: ClassificationKind::Collection,
                    from: "Aurora".to_string(),
                    to: "Amanecer".to_string()
                },
                RemoteOp::DeleteClassification {
                    kind: ClassificationKind::Collection,
                    name: "Aurora".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_rename_failure_mid_cascade_rolls_back() {
        let (store, remote, _dir) = seeded().await;
        remote.fail_when(|op| matches!(op, RemoteOp::ReassignProducts { .. }));

        let before = store.current().await;
        let err = store
            .update_category("Anillos", Classification::new("Sortijas", ""))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), Action::UpdateClassification(ClassificationKind::Category).failure_message());
        assert_eq!(store.current().await, before);
    }

    #[tokio::test]
    async fn test_description_only_update() {
        let (store, remote, _dir) = seeded().await;
        store
            .update_material("Acetato y metal", Classification::new("Acetato y metal", "Ligero"))
            .await
            .unwrap();

        assert_eq!(
            remote.writes(),
            vec![RemoteOp::UpdateDescription {
                kind: ClassificationKind::Material,
                name: "Acetato y metal".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_sentinel_is_protected() {
        let (store, remote, _dir) = seeded().await;
        let before = store.current().await;

        let err = store.delete_collection(SENTINEL_COLLECTION).await.unwrap_err();
        assert!(matches!(err, ShopError::Protected));
        let err = store
            .update_collection(SENTINEL_COLLECTION, Classification::new("Todo", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Protected));

        assert_eq!(store.current().await, before);
        assert!(remote.ops().is_empty());
    }

    #[tokio::test]
    async fn test_delete_collection_reassigns_to_fallback() {
        let (store, _remote, _dir) = seeded().await;
        let reassignment = store.delete_collection("Aurora").await.unwrap();

        assert_eq!(reassignment.moved, 4);
        assert_eq!(reassignment.fallback.as_deref(), Some("Nocturna"));
        let catalog = store.current().await;
        assert!(!catalog.contains(ClassificationKind::Collection, "Aurora"));
        assert!(catalog.products.iter().all(|p| p.collection != "Aurora"));
        assert!(catalog.dangling_references().is_empty());
    }

    #[tokio::test]
    async fn test_add_duplicate_classification_is_noop() {
        let (store, remote, _dir) = seeded().await;
        let added = store
            .add_category(Classification::new(" Aretes ", ""))
            .await
            .unwrap();
        assert!(!added);
        assert!(remote.ops().is_empty());
    }

    #[tokio::test]
    async fn test_add_blank_classification_rejected() {
        let (store, _remote, _dir) = seeded().await;
        let err = store
            .add_material(Classification::new("  ", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShopError::Validation(ValidationError::MissingField("nombre"))
        ));
    }

    #[tokio::test]
    async fn test_update_site_config() {
        let (store, remote, _dir) = seeded().await;
        let mut config = defaults::site_config();
        config.site_name = "  Lumina ".to_string();
        store.update_site_config(config).await.unwrap();

        assert_eq!(store.current().await.site_config.site_name, "Lumina");
        assert_eq!(remote.site_config().unwrap().site_name, "Lumina");
    }

    #[tokio::test]
    async fn test_mutation_writes_snapshot() {
        let (store, _remote, dir) = seeded().await;
        store.delete_product(&ProductId::parse("1").unwrap()).await.unwrap();

        let snapshot = FileSnapshotStore::new(dir.path()).load().await;
        assert_eq!(snapshot.products.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_reset_to_default() {
        let (store, remote, _dir) = seeded().await;
        store.delete_product(&ProductId::parse("1").unwrap()).await.unwrap();
        store
            .add_collection(Classification::new("Invierno", ""))
            .await
            .unwrap();

        store.reset_to_default().await.unwrap();

        assert_eq!(store.current().await, defaults::catalog());
        assert_eq!(remote.products(), defaults::products());
        assert_eq!(
            remote.classifications(ClassificationKind::Collection),
            defaults::collections()
        );
    }

    #[tokio::test]
    async fn test_reset_and_concurrent_add_settle_consistently() {
        let (store, remote, _dir) = seeded().await;

        let (reset, added) = tokio::join!(store.reset_to_default(), store.add_product(ring("99")));
        reset.unwrap();
        added.unwrap();

        let mut in_memory: Vec<ProductId> =
            store.current().await.products.into_iter().map(|p| p.id).collect();
        let mut stored: Vec<ProductId> = remote.products().into_iter().map(|p| p.id).collect();
        in_memory.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        stored.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(in_memory, stored);
        assert!(in_memory.contains(&ProductId::parse("99").unwrap()));
    }
}
