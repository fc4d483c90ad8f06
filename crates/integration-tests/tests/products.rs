//! Product add / update / delete against a reference model.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use lumina_core::{Product, ProductId};
use lumina_integration_tests::{TestContext, catalog_with_gold, ring};
use lumina_storefront::shop::ShopError;
use lumina_storefront::supabase::RemoteOp;

enum Step {
    Add(Product),
    Update(Product),
    Delete(&'static str),
}

fn renamed(id: &str, name: &str) -> Product {
    Product {
        name: name.to_string(),
        ..ring(id)
    }
}

#[tokio::test]
async fn successful_sequence_matches_reference_map() {
    let ctx = TestContext::with_catalog(&catalog_with_gold()).await;

    let mut reference: HashMap<ProductId, Product> = ctx
        .store
        .current()
        .await
        .products
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    let steps = vec![
        Step::Add(ring("100")),
        Step::Add(ring("101")),
        Step::Update(renamed("100", "Anillo Sol")),
        Step::Delete("1"),
        Step::Add(ring("102")),
        Step::Delete("101"),
        Step::Update(renamed("3", "Pulsera Nueva")),
    ];

    for step in steps {
        match step {
            Step::Add(product) => {
                ctx.store.add_product(product.clone()).await.unwrap();
                reference.insert(product.id.clone(), product);
            }
            Step::Update(product) => {
                ctx.store.update_product(product.clone()).await.unwrap();
                reference.insert(product.id.clone(), product);
            }
            Step::Delete(id) => {
                let id = ProductId::parse(id).unwrap();
                ctx.store.delete_product(&id).await.unwrap();
                reference.remove(&id);
            }
        }
    }

    let catalog = ctx.store.current().await;
    assert_eq!(catalog.products.len(), reference.len());
    for product in &catalog.products {
        assert_eq!(reference.get(&product.id), Some(product));
    }

    let mut remote: Vec<Product> = ctx.remote.products();
    let mut local = catalog.products;
    remote.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    local.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    assert_eq!(remote, local);
}

#[tokio::test]
async fn update_of_missing_product_makes_no_remote_call() {
    let ctx = TestContext::with_catalog(&catalog_with_gold()).await;

    let err = ctx.store.update_product(ring("404")).await.unwrap_err();
    assert!(matches!(err, ShopError::NotFound(_)));
    assert!(ctx.remote.writes().is_empty());
}

#[tokio::test]
async fn products_cannot_be_filed_under_todas() {
    let ctx = TestContext::with_catalog(&catalog_with_gold()).await;
    let before = ctx.store.current().await;

    let product = Product {
        collection: "Todas".to_string(),
        ..ring("100")
    };
    assert!(matches!(
        ctx.store.add_product(product).await,
        Err(ShopError::Validation(_))
    ));
    assert_eq!(ctx.store.current().await, before);
    assert!(ctx.remote.writes().is_empty());
}

#[tokio::test]
async fn delete_removes_remote_row() {
    let ctx = TestContext::seeded().await;
    let id = ProductId::parse("2").unwrap();

    ctx.store.delete_product(&id).await.unwrap();

    assert_eq!(ctx.remote.writes(), vec![RemoteOp::DeleteProduct(id.clone())]);
    assert!(ctx.remote.products().iter().all(|p| p.id != id));
}
