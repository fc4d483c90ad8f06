//! Local fallback store.
//!
//! The last catalog observed by a successful load or mutation is written to
//! a directory as one JSON file per key. It is read only when the remote
//! store cannot be reached at startup.

use std::io;
use std::path::{Path, PathBuf};

use lumina_core::{Catalog, Classification, Product, SiteConfig, defaults};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const PRODUCTS_KEY: &str = "lumina_products";
pub const COLLECTIONS_KEY: &str = "lumina_collections";
pub const CATEGORIES_KEY: &str = "lumina_categories";
pub const MATERIALS_KEY: &str = "lumina_materials";
pub const CONFIG_KEY: &str = "lumina_config";

/// Errors writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whatever could be read back. Missing or unreadable keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub products: Option<Vec<Product>>,
    pub collections: Option<Vec<Classification>>,
    pub categories: Option<Vec<Classification>>,
    pub materials: Option<Vec<Classification>>,
    pub config: Option<SiteConfig>,
}

impl Snapshot {
    /// No key could be read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products.is_none()
            && self.collections.is_none()
            && self.categories.is_none()
            && self.materials.is_none()
            && self.config.is_none()
    }

    /// Build a catalog, filling missing keys from the defaults.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        let mut catalog = Catalog {
            products: self.products.unwrap_or_else(defaults::products),
            collections: self.collections.unwrap_or_else(defaults::collections),
            categories: self.categories.unwrap_or_else(defaults::categories),
            materials: self.materials.unwrap_or_else(defaults::materials),
            site_config: self.config.unwrap_or_else(defaults::site_config),
        };
        catalog.sort_all();
        catalog
    }
}

/// Directory-backed snapshot store.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read every key. Never fails: corrupt files are logged and skipped.
    pub async fn load(&self) -> Snapshot {
        Snapshot {
            products: self.read(PRODUCTS_KEY).await,
            collections: self.read(COLLECTIONS_KEY).await,
            categories: self.read(CATEGORIES_KEY).await,
            materials: self.read(MATERIALS_KEY).await,
            config: self.read(CONFIG_KEY).await,
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read snapshot");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt snapshot");
                None
            }
        }
    }

    /// Write the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file cannot
    /// be written.
    pub async fn save(&self, catalog: &Catalog) -> Result<(), SnapshotError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.dir.clone(),
                source,
            })?;

        self.write(PRODUCTS_KEY, &catalog.products).await?;
        self.write(COLLECTIONS_KEY, &catalog.collections).await?;
        self.write(CATEGORIES_KEY, &catalog.categories).await?;
        self.write(MATERIALS_KEY, &catalog.materials).await?;
        self.write(CONFIG_KEY, &catalog.site_config).await
    }

    /// Write to a temporary file and rename it over the target.
    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| SnapshotError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| SnapshotError::Io { path, source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("absent"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        let mut catalog = defaults::catalog();
        catalog.site_config.site_name = "Lumina".to_string();

        store.save(&catalog).await.unwrap();
        let snapshot = store.load().await;

        assert!(dir.path().join("lumina_products.json").exists());
        assert!(!dir.path().join("lumina_products.json.tmp").exists());
        assert_eq!(snapshot.into_catalog(), catalog);
    }

    #[tokio::test]
    async fn test_corrupt_key_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        store.save(&defaults::catalog()).await.unwrap();
        tokio::fs::write(dir.path().join("lumina_config.json"), b"{not json")
            .await
            .unwrap();

        let snapshot = store.load().await;
        assert!(snapshot.products.is_some());
        assert!(snapshot.config.is_none());
        assert_eq!(snapshot.into_catalog().site_config, defaults::site_config());
    }
}
