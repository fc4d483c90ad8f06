//! Wire rows for the remote tables.
//!
//! Read rows use `Option` for every column so that a malformed row surfaces
//! as a conversion error rather than failing the whole response. Nullable
//! text columns become empty strings.

use lumina_core::{
    Classification, ClassificationKind, Product, ProductId, SITE_CONFIG_ID, SiteConfig, SocialLink,
};
use serde::{Deserialize, Serialize};

use super::RemoteError;

/// Product ids are text, but tolerate numeric ids from hand-edited tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRow {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub collection: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub image_url: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RemoteError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| RemoteError::InvalidRow {
            table: "products",
            reason: reason.to_owned(),
        };

        let id = match row.id {
            Some(RawId::Text(text)) => ProductId::parse(&text),
            Some(RawId::Number(number)) => ProductId::parse(&number.to_string()),
            None => None,
        }
        .ok_or_else(|| invalid("missing id"))?;

        let name = row
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| invalid(&format!("product {id} has no name")))?;

        Ok(Self {
            id,
            name,
            category: row.category.unwrap_or_default(),
            collection: row.collection.unwrap_or_default(),
            price: row.price.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            material: row.material.unwrap_or_default(),
            image_url: row.image_url.unwrap_or_default(),
        })
    }
}

/// Product as written to the `products` table.
#[derive(Debug, Serialize)]
pub struct ProductRecord<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub category: &'a str,
    pub collection: &'a str,
    pub price: &'a str,
    pub description: &'a str,
    pub material: &'a str,
    pub image_url: &'a str,
}

impl<'a> From<&'a Product> for ProductRecord<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            id: product.id.as_str(),
            name: &product.name,
            category: &product.category,
            collection: &product.collection,
            price: &product.price,
            description: &product.description,
            material: &product.material,
            image_url: &product.image_url,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationRow {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ClassificationRow {
    /// Convert into a domain value, naming the table in errors.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidRow`] when the name is missing or blank.
    pub fn into_classification(
        self,
        kind: ClassificationKind,
    ) -> Result<Classification, RemoteError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| RemoteError::InvalidRow {
                table: kind.table(),
                reason: "missing name".to_owned(),
            })?;
        Ok(Classification::new(name, self.description.unwrap_or_default()))
    }
}

/// Classification as written to its table.
#[derive(Debug, Serialize)]
pub struct ClassificationRecord<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a Classification> for ClassificationRecord<'a> {
    fn from(data: &'a Classification) -> Self {
        Self {
            name: &data.name,
            description: &data.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfigRow {
    pub id: Option<i64>,
    pub site_name: Option<String>,
    pub logo_url: Option<String>,
    pub footer_text: Option<String>,
    pub social_links: Option<serde_json::Value>,
}

impl TryFrom<SiteConfigRow> for SiteConfig {
    type Error = RemoteError;

    fn try_from(row: SiteConfigRow) -> Result<Self, Self::Error> {
        if row.id.is_some_and(|id| id != SITE_CONFIG_ID) {
            return Err(RemoteError::InvalidRow {
                table: "site_config",
                reason: format!("unexpected id {:?}", row.id),
            });
        }

        Ok(Self {
            site_name: row.site_name.unwrap_or_default(),
            logo_url: row.logo_url.filter(|url| !url.is_empty()),
            footer_text: row.footer_text.unwrap_or_default(),
            social_links: row.social_links.map(parse_social_links).unwrap_or_default(),
        })
    }
}

/// Keep the well-formed `{platform, url}` entries of a JSON array.
fn parse_social_links(value: serde_json::Value) -> Vec<SocialLink> {
    let serde_json::Value::Array(items) = value else {
        tracing::warn!("site_config.social_links is not an array, ignoring");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<SocialLink>(item) {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed social link");
                None
            }
        })
        .collect()
}

/// Site config as written to the `site_config` table.
#[derive(Debug, Serialize)]
pub struct SiteConfigRecord<'a> {
    pub id: i64,
    pub site_name: &'a str,
    pub logo_url: Option<&'a str>,
    pub footer_text: &'a str,
    pub social_links: &'a [SocialLink],
}

impl<'a> From<&'a SiteConfig> for SiteConfigRecord<'a> {
    fn from(config: &'a SiteConfig) -> Self {
        Self {
            id: SITE_CONFIG_ID,
            site_name: &config.site_name,
            logo_url: config.logo_url.as_deref(),
            footer_text: &config.footer_text,
            social_links: &config.social_links,
        }
    }
}

/// Convert rows, logging and dropping the ones that fail.
pub fn keep_valid<R, T>(rows: Vec<R>, convert: impl Fn(R) -> Result<T, RemoteError>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match convert(row) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid remote row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_row_nullable_columns() {
        let row: ProductRow =
            serde_json::from_str(r#"{"id":"7","name":"Anillo","price":null,"image_url":null}"#)
                .unwrap();
        let product = Product::try_from(row).unwrap();
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.price, "");
        assert_eq!(product.image_url, "");
    }

    #[test]
    fn test_product_row_numeric_id() {
        let row: ProductRow = serde_json::from_str(r#"{"id":12,"name":"Aro"}"#).unwrap();
        assert_eq!(Product::try_from(row).unwrap().id.as_str(), "12");
    }

    #[test]
    fn test_product_row_rejects_blank_name() {
        let row: ProductRow = serde_json::from_str(r#"{"id":"1","name":"  "}"#).unwrap();
        assert!(matches!(
            Product::try_from(row),
            Err(RemoteError::InvalidRow { table: "products", .. })
        ));
    }

    #[test]
    fn test_product_record_uses_snake_case() {
        let row: ProductRow = serde_json::from_str(r#"{"id":"1","name":"A"}"#).unwrap();
        let product = Product::try_from(row).unwrap();
        let json = serde_json::to_value(ProductRecord::from(&product)).unwrap();
        assert!(json.get("image_url").is_some());
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_site_config_row_skips_bad_links() {
        let row: SiteConfigRow = serde_json::from_str(
            r##"{"id":1,"site_name":"Lumina","logo_url":"","footer_text":null,
                "social_links":[{"platform":"Instagram","url":"#"},{"platform":3}]}"##,
        )
        .unwrap();
        let config = SiteConfig::try_from(row).unwrap();
        assert_eq!(config.site_name, "Lumina");
        assert!(config.logo_url.is_none());
        assert_eq!(config.social_links, vec![SocialLink::new("Instagram", "#")]);
    }

    #[test]
    fn test_keep_valid_drops_invalid() {
        let rows = vec![
            ClassificationRow {
                name: Some("Aurora".to_string()),
                description: None,
            },
            ClassificationRow::default(),
        ];
        let kept = keep_valid(rows, |row| {
            row.into_classification(ClassificationKind::Collection)
        });
        assert_eq!(kept, vec![Classification::new("Aurora", "")]);
    }
}
