//! Domain types for the Lumina catalog.

pub mod classification;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod site_config;

pub use classification::{
    CategoryData, Classification, ClassificationKind, CollectionData, MaterialData,
    SENTINEL_COLLECTION, UnknownKind,
};
pub use email::{Email, EmailError};
pub use id::ProductId;
pub use price::{DEFAULT_PRICE_SUFFIX, DisplayPrice, PriceChange};
pub use product::{Product, ProductDraft, ValidationError};
pub use site_config::{SITE_CONFIG_ID, SiteConfig, SocialLink};
