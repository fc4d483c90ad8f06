//! In-memory remote store and auth provider.
//!
//! Behave like the hosted service closely enough for the shop store and the
//! HTTP routes to be exercised without a network: tables keep insertion
//! order, names are unique keys, and every attempted operation is logged.
//! A failure predicate can make any operation fail.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use lumina_core::catalog::{collate, product_field_mut};
use lumina_core::{Catalog, Classification, ClassificationKind, Email, Product, ProductId, SiteConfig};
use secrecy::{ExposeSecret, SecretString};

use super::auth::{AuthError, AuthProvider, AuthSession, AuthUser};
use super::{RemoteError, RemoteStore};

/// An operation attempted against [`MemoryRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    Ping,
    ListProducts,
    UpsertProduct(ProductId),
    DeleteProduct(ProductId),
    DeleteAllProducts,
    ReassignProducts {
        kind: ClassificationKind,
        from: String,
        to: String,
    },
    ListClassifications(ClassificationKind),
    InsertClassification {
        kind: ClassificationKind,
        name: String,
    },
    UpsertClassifications(ClassificationKind),
    UpdateDescription {
        kind: ClassificationKind,
        name: String,
    },
    DeleteClassification {
        kind: ClassificationKind,
        name: String,
    },
    DeleteAllClassifications(ClassificationKind),
    LoadSiteConfig,
    SaveSiteConfig,
}

impl RemoteOp {
    /// Whether the operation changes remote data.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::Ping | Self::ListProducts | Self::ListClassifications(_) | Self::LoadSiteConfig
        )
    }
}

type FailurePredicate = Box<dyn Fn(&RemoteOp) -> bool + Send + Sync>;

#[derive(Debug, Default)]
struct Tables {
    /// Oldest first.
    products: Vec<Product>,
    collections: Vec<Classification>,
    categories: Vec<Classification>,
    materials: Vec<Classification>,
    site_config: Option<SiteConfig>,
}

impl Tables {
    fn classifications_mut(&mut self, kind: ClassificationKind) -> &mut Vec<Classification> {
        match kind {
            ClassificationKind::Collection => &mut self.collections,
            ClassificationKind::Category => &mut self.categories,
            ClassificationKind::Material => &mut self.materials,
        }
    }
}

/// In-memory [`RemoteStore`].
#[derive(Default)]
pub struct MemoryRemote {
    tables: Mutex<Tables>,
    fail_when: Mutex<Option<FailurePredicate>>,
    log: Mutex<Vec<RemoteOp>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRemote {
    /// An empty remote, as on first run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote already holding `catalog`.
    #[must_use]
    pub fn with_catalog(catalog: &Catalog) -> Self {
        let remote = Self::new();
        {
            let mut tables = lock(&remote.tables);
            tables.products.clone_from(&catalog.products);
            tables.collections.clone_from(&catalog.collections);
            tables.categories.clone_from(&catalog.categories);
            tables.materials.clone_from(&catalog.materials);
            tables.site_config = Some(catalog.site_config.clone());
        }
        remote
    }

    /// Make every operation matching `predicate` fail with
    /// [`RemoteError::Injected`]. Replaces any previous predicate.
    pub fn fail_when(&self, predicate: impl Fn(&RemoteOp) -> bool + Send + Sync + 'static) {
        *lock(&self.fail_when) = Some(Box::new(predicate));
    }

    /// Fail everything, as if the service were unreachable.
    pub fn go_offline(&self) {
        self.fail_when(|_| true);
    }

    pub fn clear_failures(&self) {
        *lock(&self.fail_when) = None;
    }

    /// Every operation attempted so far, including failed ones.
    #[must_use]
    pub fn ops(&self) -> Vec<RemoteOp> {
        lock(&self.log).clone()
    }

    /// Attempted write operations only.
    #[must_use]
    pub fn writes(&self) -> Vec<RemoteOp> {
        lock(&self.log)
            .iter()
            .filter(|op| op.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_log(&self) {
        lock(&self.log).clear();
    }

    /// Products in insertion order.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.tables).products.clone()
    }

    /// Stored entries of `kind` in insertion order.
    #[must_use]
    pub fn classifications(&self, kind: ClassificationKind) -> Vec<Classification> {
        lock(&self.tables).classifications_mut(kind).clone()
    }

    #[must_use]
    pub fn site_config(&self) -> Option<SiteConfig> {
        lock(&self.tables).site_config.clone()
    }

    /// Log `op` and decide whether it fails.
    fn attempt(&self, op: RemoteOp) -> Result<(), RemoteError> {
        let fails = lock(&self.fail_when)
            .as_ref()
            .is_some_and(|predicate| predicate(&op));
        let description = format!("{op:?}");
        lock(&self.log).push(op);
        if fails {
            Err(RemoteError::Injected(description))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn ping(&self) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::Ping)
    }

    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.attempt(RemoteOp::ListProducts)?;
        Ok(lock(&self.tables).products.iter().rev().cloned().collect())
    }

    async fn upsert_products(&self, products: &[Product]) -> Result<(), RemoteError> {
        for product in products {
            self.attempt(RemoteOp::UpsertProduct(product.id.clone()))?;
        }
        let mut tables = lock(&self.tables);
        for product in products {
            match tables.products.iter_mut().find(|p| p.id == product.id) {
                Some(existing) => existing.clone_from(product),
                None => tables.products.push(product.clone()),
            }
        }
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::DeleteProduct(id.clone()))?;
        lock(&self.tables).products.retain(|p| &p.id != id);
        Ok(())
    }

    async fn delete_all_products(&self) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::DeleteAllProducts)?;
        lock(&self.tables).products.clear();
        Ok(())
    }

    async fn reassign_products(
        &self,
        kind: ClassificationKind,
        from: &str,
        to: &str,
    ) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::ReassignProducts {
            kind,
            from: from.to_owned(),
            to: to.to_owned(),
        })?;
        for product in &mut lock(&self.tables).products {
            let field = product_field_mut(product, kind);
            if *field == *from {
                to.clone_into(field);
            }
        }
        Ok(())
    }

    async fn list_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<Vec<Classification>, RemoteError> {
        self.attempt(RemoteOp::ListClassifications(kind))?;
        let mut list = lock(&self.tables).classifications_mut(kind).clone();
        list.sort_by(|a, b| collate(&a.name, &b.name));
        Ok(list)
    }

    async fn insert_classification(
        &self,
        kind: ClassificationKind,
        data: &Classification,
    ) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::InsertClassification {
            kind,
            name: data.name.clone(),
        })?;
        let mut tables = lock(&self.tables);
        let list = tables.classifications_mut(kind);
        if list.iter().any(|c| c.name == data.name) {
            return Err(RemoteError::Api {
                status: 409,
                message: format!("duplicate key value violates unique constraint on {}", kind.table()),
            });
        }
        list.push(data.clone());
        Ok(())
    }

    async fn upsert_classifications(
        &self,
        kind: ClassificationKind,
        data: &[Classification],
    ) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::UpsertClassifications(kind))?;
        let mut tables = lock(&self.tables);
        let list = tables.classifications_mut(kind);
        for entry in data {
            match list.iter_mut().find(|c| c.name == entry.name) {
                Some(existing) => existing.clone_from(entry),
                None => list.push(entry.clone()),
            }
        }
        Ok(())
    }

    async fn update_description(
        &self,
        kind: ClassificationKind,
        name: &str,
        description: &str,
    ) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::UpdateDescription {
            kind,
            name: name.to_owned(),
        })?;
        let mut tables = lock(&self.tables);
        if let Some(entry) = tables
            .classifications_mut(kind)
            .iter_mut()
            .find(|c| c.name == name)
        {
            description.clone_into(&mut entry.description);
        }
        Ok(())
    }

    async fn delete_classification(
        &self,
        kind: ClassificationKind,
        name: &str,
    ) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::DeleteClassification {
            kind,
            name: name.to_owned(),
        })?;
        lock(&self.tables)
            .classifications_mut(kind)
            .retain(|c| c.name != name);
        Ok(())
    }

    async fn delete_all_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::DeleteAllClassifications(kind))?;
        lock(&self.tables).classifications_mut(kind).clear();
        Ok(())
    }

    async fn load_site_config(&self) -> Result<Option<SiteConfig>, RemoteError> {
        self.attempt(RemoteOp::LoadSiteConfig)?;
        Ok(lock(&self.tables).site_config.clone())
    }

    async fn save_site_config(&self, config: &SiteConfig) -> Result<(), RemoteError> {
        self.attempt(RemoteOp::SaveSiteConfig)?;
        lock(&self.tables).site_config = Some(config.clone());
        Ok(())
    }
}

/// In-memory [`AuthProvider`] with a fixed set of accounts.
#[derive(Default)]
pub struct MemoryAuth {
    accounts: HashMap<String, (AuthUser, String)>,
    tokens: Mutex<HashMap<String, AuthUser>>,
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account.
    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_owned()),
        };
        self.accounts
            .insert(email.to_lowercase(), (user, password.to_owned()));
        self
    }

    /// Invalidate every issued token, as if they had expired.
    pub fn expire_all(&self) {
        lock(&self.tokens).clear();
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let (user, expected) = self
            .accounts
            .get(&email.as_str().to_lowercase())
            .ok_or(AuthError::InvalidCredentials)?;
        if expected != password.expose_secret() {
            return Err(AuthError::InvalidCredentials);
        }

        let token = format!("token-{}", uuid::Uuid::new_v4());
        lock(&self.tokens).insert(token.clone(), user.clone());
        Ok(AuthSession {
            access_token: SecretString::from(token),
            user: user.clone(),
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(lock(&self.tokens).get(access_token).cloned())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        lock(&self.tokens).remove(access_token);
        Ok(())
    }
}
