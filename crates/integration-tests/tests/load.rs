//! Initial load: seeding an empty remote, snapshot and default fallbacks.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use lumina_core::{ClassificationKind, defaults};
use lumina_integration_tests::TestContext;
use lumina_storefront::shop::LoadSource;
use lumina_storefront::snapshot::FileSnapshotStore;
use lumina_storefront::supabase::MemoryRemote;

#[tokio::test]
async fn empty_remote_is_seeded_with_defaults() {
    let ctx = TestContext::with_remote(MemoryRemote::new()).await;

    assert_eq!(ctx.source, LoadSource::Remote);
    assert_eq!(ctx.store.current().await, defaults::catalog());

    assert_eq!(ctx.remote.products(), defaults::products());
    assert_eq!(
        ctx.remote.classifications(ClassificationKind::Collection),
        defaults::collections()
    );
    assert_eq!(ctx.remote.site_config(), Some(defaults::site_config()));
}

#[tokio::test]
async fn remote_load_writes_snapshot() {
    let ctx = TestContext::seeded().await;

    let snapshot = FileSnapshotStore::new(ctx.snapshot_dir()).load().await;
    assert_eq!(snapshot.into_catalog(), defaults::catalog());
}

#[tokio::test]
async fn offline_remote_falls_back_to_snapshot() {
    let first = TestContext::with_catalog(&lumina_integration_tests::catalog_with_gold()).await;
    first
        .store
        .add_product(lumina_integration_tests::ring("100"))
        .await
        .unwrap();
    let expected = first.store.current().await;
    first.store.write_snapshot().await;

    let offline = Arc::new(MemoryRemote::new());
    offline.go_offline();
    let ctx = TestContext::load_in(offline, first.dir).await;

    assert_eq!(ctx.source, LoadSource::Snapshot);
    assert_eq!(ctx.store.current().await, expected);
}

#[tokio::test]
async fn offline_remote_without_snapshot_uses_defaults() {
    let offline = MemoryRemote::new();
    offline.go_offline();
    let ctx = TestContext::with_remote(offline).await;

    assert_eq!(ctx.source, LoadSource::Defaults);
    assert_eq!(ctx.store.current().await, defaults::catalog());
}
