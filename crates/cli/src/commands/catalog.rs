//! Catalog maintenance against the hosted data service.
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL
//! - `SUPABASE_ANON_KEY` - Public API key

use lumina_core::ClassificationKind;
use lumina_storefront::config::{ConfigError, SupabaseConfig};
use lumina_storefront::shop::{fetch_or_seed, reseed};
use lumina_storefront::supabase::{RemoteError, RemoteStore, RestClient};
use thiserror::Error;

/// Errors that can occur during catalog commands.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Data service error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Refusing to reset without --yes")]
    NotConfirmed,

    #[error("Failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

fn connect() -> Result<RestClient, CatalogCommandError> {
    let config = SupabaseConfig::from_env()?;
    tracing::info!(url = %config.url, "Connecting to data service...");
    Ok(RestClient::new(&config)?)
}

/// Ping the data service and report table sizes.
pub async fn check() -> Result<(), CatalogCommandError> {
    let client = connect()?;
    client.ping().await?;

    let products = client.list_products().await?;
    tracing::info!("Connection OK");
    tracing::info!("  products: {}", products.len());
    for kind in ClassificationKind::ALL {
        let entries = client.list_classifications(kind).await?;
        tracing::info!("  {}: {}", kind.table(), entries.len());
    }
    Ok(())
}

/// Seed every empty table with the built-in catalog.
pub async fn seed() -> Result<(), CatalogCommandError> {
    let client = connect()?;
    let catalog = fetch_or_seed(&client).await?;

    tracing::info!(
        products = catalog.products.len(),
        collections = catalog.collections.len(),
        categories = catalog.categories.len(),
        materials = catalog.materials.len(),
        "Seed complete"
    );
    Ok(())
}

/// Delete all products and classifications and reseed the defaults.
pub async fn reset(confirmed: bool) -> Result<(), CatalogCommandError> {
    if !confirmed {
        return Err(CatalogCommandError::NotConfirmed);
    }

    let client = connect()?;
    tracing::warn!("Resetting the catalog to the defaults");
    reseed(&client).await?;
    tracing::info!("Reset complete");
    Ok(())
}

/// Print the stored site configuration as JSON.
#[allow(clippy::print_stdout)]
pub async fn show_config() -> Result<(), CatalogCommandError> {
    let client = connect()?;
    match client.load_site_config().await? {
        Some(config) => println!("{}", serde_json::to_string_pretty(&config)?),
        None => tracing::warn!("No site configuration stored yet"),
    }
    Ok(())
}
