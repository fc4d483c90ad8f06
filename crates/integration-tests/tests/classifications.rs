//! Rename and delete cascades, and the protected "Todas" collection.

#![allow(clippy::unwrap_used)]

use lumina_core::{Classification, ClassificationKind, ProductId, SENTINEL_COLLECTION};
use lumina_integration_tests::{TestContext, catalog_with_gold, ring};
use lumina_storefront::shop::ShopError;

#[tokio::test]
async fn rename_moves_every_product() {
    let ctx = TestContext::seeded().await;
    let before = ctx.store.current().await;
    let under_aurora: Vec<ProductId> = before
        .products
        .iter()
        .filter(|p| p.collection == "Aurora")
        .map(|p| p.id.clone())
        .collect();
    assert!(!under_aurora.is_empty());

    let moved = ctx
        .store
        .update_collection("Aurora", Classification::new("Amanecer", "Luz de la mañana"))
        .await
        .unwrap();
    assert_eq!(moved, under_aurora.len());

    let after = ctx.store.current().await;
    assert!(after.products.iter().all(|p| p.collection != "Aurora"));
    for id in &under_aurora {
        assert_eq!(after.product(id).unwrap().collection, "Amanecer");
    }
    assert!(after.contains(ClassificationKind::Collection, "Amanecer"));
    assert!(!after.contains(ClassificationKind::Collection, "Aurora"));

    assert!(ctx.remote.products().iter().all(|p| p.collection != "Aurora"));
    let remote_names: Vec<String> = ctx
        .remote
        .classifications(ClassificationKind::Collection)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert!(remote_names.contains(&"Amanecer".to_string()));
    assert!(!remote_names.contains(&"Aurora".to_string()));
}

#[tokio::test]
async fn renamed_collection_scenario() {
    let ctx = TestContext::with_catalog(&catalog_with_gold()).await;
    ctx.store.add_product(ring("1000")).await.unwrap();

    ctx.store
        .update_collection("Aurora", Classification::new("Amanecer", "..."))
        .await
        .unwrap();

    let catalog = ctx.store.catalog().await;
    let product = catalog.product(&ProductId::parse("1000").unwrap()).unwrap();
    assert_eq!(product.collection, "Amanecer");
}

#[tokio::test]
async fn delete_reassigns_to_one_fallback() {
    for kind in ClassificationKind::ALL {
        let ctx = TestContext::seeded().await;
        let before = ctx.store.current().await;
        let victim = before
            .classifications(kind)
            .iter()
            .find(|c| !c.is_sentinel())
            .map(|c| c.name.clone())
            .unwrap();
        let affected: Vec<ProductId> = before
            .products
            .iter()
            .filter(|p| lumina_core::catalog::product_field(p, kind) == victim)
            .map(|p| p.id.clone())
            .collect();

        let reassignment = ctx.store.delete_classification(kind, &victim).await.unwrap();
        let after = ctx.store.current().await;

        assert!(!after.contains(kind, &victim));
        assert_eq!(reassignment.moved, affected.len());
        let fallback = reassignment.fallback.unwrap();
        assert_ne!(fallback, victim);
        assert_ne!(fallback, SENTINEL_COLLECTION);
        for id in &affected {
            let product = after.product(id).unwrap();
            assert_eq!(lumina_core::catalog::product_field(product, kind), fallback);
        }
        assert!(
            after
                .products
                .iter()
                .all(|p| lumina_core::catalog::product_field(p, kind) != victim)
        );
    }
}

#[tokio::test]
async fn todas_cannot_be_renamed_or_deleted() {
    let ctx = TestContext::seeded().await;
    let before = ctx.store.current().await;

    assert!(matches!(
        ctx.store
            .update_collection(SENTINEL_COLLECTION, Classification::new("Todo", ""))
            .await,
        Err(ShopError::Protected)
    ));
    assert!(matches!(
        ctx.store.delete_collection(SENTINEL_COLLECTION).await,
        Err(ShopError::Protected)
    ));

    assert_eq!(ctx.store.current().await, before);
    assert!(ctx.remote.writes().is_empty());
}

#[tokio::test]
async fn duplicate_add_is_a_no_op() {
    let ctx = TestContext::seeded().await;
    let before = ctx.store.current().await;

    let added = ctx
        .store
        .add_category(Classification::new("Anillos", "otra vez"))
        .await
        .unwrap();

    assert!(!added);
    assert_eq!(ctx.store.current().await, before);
    assert!(ctx.remote.writes().is_empty());
}
