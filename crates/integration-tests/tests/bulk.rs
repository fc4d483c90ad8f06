//! Bulk actions keep per-item outcomes.

#![allow(clippy::unwrap_used)]

use lumina_core::{ClassificationKind, PriceChange, ProductId};
use lumina_integration_tests::{TestContext, ids};
use lumina_storefront::shop::{Action, ShopError};
use lumina_storefront::supabase::RemoteOp;
use rust_decimal::Decimal;

fn price_of(catalog: &lumina_core::Catalog, id: &str) -> String {
    catalog
        .product(&ProductId::parse(id).unwrap())
        .unwrap()
        .price
        .clone()
}

#[tokio::test]
async fn one_failed_price_update_keeps_the_other_two() {
    let ctx = TestContext::seeded().await;
    let before = ctx.store.current().await;
    let failing = ProductId::parse("2").unwrap();
    let target = failing.clone();
    ctx.remote
        .fail_when(move |op| *op == RemoteOp::UpsertProduct(target.clone()));

    let outcome = ctx
        .store
        .bulk_update_prices(&ids(&["1", "2", "3"]), PriceChange::Set(Decimal::new(99, 0)))
        .await;

    assert_eq!(outcome.action, Action::BulkUpdate);
    assert_eq!(outcome.succeeded, ids(&["1", "3"]));
    assert_eq!(outcome.failed, vec![failing]);

    let after = ctx.store.current().await;
    assert_eq!(price_of(&after, "1"), "99.00 €");
    assert_eq!(price_of(&after, "3"), "99.00 €");
    assert_eq!(price_of(&after, "2"), price_of(&before, "2"));
}

#[tokio::test]
async fn bulk_delete_restores_only_failed_items() {
    let ctx = TestContext::seeded().await;
    let before = ctx.store.current().await;
    ctx.remote.fail_when(|op| {
        matches!(op, RemoteOp::DeleteProduct(id) if id.as_str() == "4")
    });

    let outcome = ctx.store.bulk_delete(&ids(&["4", "5"])).await;

    assert_eq!(outcome.succeeded, ids(&["5"]));
    assert_eq!(outcome.failed, ids(&["4"]));
    let after = ctx.store.current().await;
    assert_eq!(after.products.len(), before.products.len() - 1);
    assert!(after.product(&ProductId::parse("4").unwrap()).is_some());
    assert!(after.product(&ProductId::parse("5").unwrap()).is_none());

    let order: Vec<&ProductId> = after.products.iter().map(|p| &p.id).collect();
    let expected: Vec<&ProductId> = before
        .products
        .iter()
        .map(|p| &p.id)
        .filter(|id| id.as_str() != "5")
        .collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn bulk_move_rejects_todas_and_unknown_targets() {
    let ctx = TestContext::seeded().await;
    let before = ctx.store.current().await;

    assert!(matches!(
        ctx.store
            .bulk_move(&ids(&["1"]), ClassificationKind::Collection, "Todas")
            .await,
        Err(ShopError::Validation(_))
    ));
    assert!(matches!(
        ctx.store
            .bulk_move(&ids(&["1"]), ClassificationKind::Material, "Platino")
            .await,
        Err(ShopError::Validation(_))
    ));
    assert_eq!(ctx.store.current().await, before);
}

#[tokio::test]
async fn bulk_move_files_products_under_target() {
    let ctx = TestContext::seeded().await;

    let outcome = ctx
        .store
        .bulk_move(&ids(&["1", "2"]), ClassificationKind::Collection, "Orgánica")
        .await
        .unwrap();

    assert!(!outcome.has_failures());
    let after = ctx.store.current().await;
    for id in ["1", "2"] {
        let product = after.product(&ProductId::parse(id).unwrap()).unwrap();
        assert_eq!(product.collection, "Orgánica");
    }
}
