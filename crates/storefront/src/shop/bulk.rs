//! Multi-select product operations.
//!
//! All selected products are changed in memory at once, then one remote call
//! per product runs concurrently. Items whose call fails are reverted on
//! their own; siblings that succeeded stay applied.

use std::collections::HashSet;
use std::slice;

use futures::future::join_all;
use lumina_core::catalog::product_field_mut;
use lumina_core::{ClassificationKind, PriceChange, Product, ProductId, SENTINEL_COLLECTION, ValidationError};
use tracing::instrument;

use super::{Action, ShopError, ShopStore};

/// Per-item result of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub action: Action,
    pub succeeded: Vec<ProductId>,
    pub failed: Vec<ProductId>,
    /// Unknown ids, or products the change would not alter.
    pub skipped: Vec<ProductId>,
}

impl BulkOutcome {
    const fn new(action: Action) -> Self {
        Self {
            action,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Banner text for the editor.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = match self.action {
            Action::BulkDelete => "eliminaron",
            _ => "actualizaron",
        };
        let attempted = self.succeeded.len() + self.failed.len();
        let mut text = format!("Se {verb} {} de {attempted} productos.", self.succeeded.len());
        if self.has_failures() {
            text.push(' ');
            text.push_str(self.action.failure_message());
        }
        text
    }
}

/// Drop repeated ids, keeping the first occurrence.
fn distinct(ids: &[ProductId]) -> Vec<&ProductId> {
    let mut seen = HashSet::new();
    ids.iter().filter(|id| seen.insert(*id)).collect()
}

impl ShopStore {
    /// Apply `edit` to every selected product and upsert each changed one.
    async fn bulk_replace<E>(&self, action: Action, ids: &[ProductId], edit: E) -> BulkOutcome
    where
        E: Fn(&Product) -> Option<Product>,
    {
        let _gate = self.write_gate.lock().await;
        let mut outcome = BulkOutcome::new(action);

        let mut pending: Vec<(Product, Product)> = Vec::new();
        {
            let mut catalog = self.catalog.write().await;
            // Every edit is computed before the first one is applied.
            for id in distinct(ids) {
                let Some(before) = catalog.product(id).cloned() else {
                    outcome.skipped.push(id.clone());
                    continue;
                };
                match edit(&before) {
                    Some(after) if after != before => pending.push((before, after)),
                    _ => outcome.skipped.push(id.clone()),
                }
            }
            for (_, after) in &pending {
                catalog.replace_product(after.clone()).ok();
            }
        }

        let results = join_all(
            pending
                .iter()
                .map(|(_, after)| self.remote.upsert_products(slice::from_ref(after))),
        )
        .await;

        {
            let mut catalog = self.catalog.write().await;
            for ((before, _), result) in pending.into_iter().zip(results) {
                match result {
                    Ok(()) => outcome.succeeded.push(before.id),
                    Err(e) => {
                        tracing::warn!(?action, product_id = %before.id, error = %e, "Bulk item failed, reverting it");
                        outcome.failed.push(before.id.clone());
                        catalog.replace_product(before).ok();
                    }
                }
            }
        }

        if !outcome.succeeded.is_empty() {
            self.write_snapshot().await;
        }
        outcome
    }

    /// Change the price of every selected product.
    ///
    /// Products whose price has no numeric part cannot take a percentage
    /// adjustment and are skipped.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_update_prices(&self, ids: &[ProductId], change: PriceChange) -> BulkOutcome {
        self.bulk_replace(Action::BulkUpdate, ids, |product| {
            let price = change.apply(&product.price)?;
            Some(Product {
                price,
                ..product.clone()
            })
        })
        .await
    }

    /// File every selected product under the `kind` entry named `to`.
    ///
    /// # Errors
    ///
    /// Validation errors when `to` does not exist or is "Todas"; nothing is
    /// changed in that case.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_move(
        &self,
        ids: &[ProductId],
        kind: ClassificationKind,
        to: &str,
    ) -> Result<BulkOutcome, ShopError> {
        if kind.has_sentinel() && to == SENTINEL_COLLECTION {
            return Err(ValidationError::SentinelCollection.into());
        }
        if !self.catalog.read().await.contains(kind, to) {
            return Err(ValidationError::UnknownReference {
                kind,
                value: to.to_owned(),
            }
            .into());
        }

        Ok(self
            .bulk_replace(Action::BulkUpdate, ids, |product| {
                let mut moved = product.clone();
                to.clone_into(product_field_mut(&mut moved, kind));
                Some(moved)
            })
            .await)
    }

    /// Delete every selected product.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[ProductId]) -> BulkOutcome {
        let _gate = self.write_gate.lock().await;
        let mut outcome = BulkOutcome::new(Action::BulkDelete);

        let (before, targets) = {
            let mut catalog = self.catalog.write().await;
            let before = catalog.products.clone();
            let mut targets = Vec::new();
            for id in distinct(ids) {
                match catalog.remove_product(id) {
                    Ok(product) => targets.push(product.id),
                    Err(_) => outcome.skipped.push(id.clone()),
                }
            }
            (before, targets)
        };

        let results = join_all(targets.iter().map(|id| self.remote.delete_product(id))).await;
        for (id, result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => outcome.succeeded.push(id),
                Err(e) => {
                    tracing::warn!(product_id = %id, error = %e, "Bulk delete failed, restoring product");
                    outcome.failed.push(id);
                }
            }
        }

        if outcome.has_failures() {
            let deleted: HashSet<&ProductId> = outcome.succeeded.iter().collect();
            self.catalog.write().await.products =
                before.into_iter().filter(|p| !deleted.contains(&p.id)).collect();
        }
        if !outcome.succeeded.is_empty() {
            self.write_snapshot().await;
        }
        outcome
    }
}
