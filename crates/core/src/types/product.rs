//! Catalog products.

use serde::{Deserialize, Serialize};

use super::classification::ClassificationKind;
use super::id::ProductId;

/// A product in the catalog.
///
/// `category`, `collection` and `material` reference classification entries
/// by name. The local snapshot format uses camelCase field names (`imageUrl`),
/// the remote store uses `image_url`; the remote mapping lives with the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub collection: String,
    /// Display-formatted price, e.g. `"25.00 €"`.
    pub price: String,
    pub description: String,
    pub material: String,
    /// Image URL or `data:` URL of an uploaded image.
    pub image_url: String,
}

/// Why a product form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was blank.
    #[error("el campo {0} es obligatorio")]
    MissingField(&'static str),

    /// A classification field names an entry that does not exist.
    #[error("\"{value}\" no existe en {}", kind.plural_label())]
    UnknownReference {
        kind: ClassificationKind,
        value: String,
    },

    /// Products cannot be filed under the "Todas" collection.
    #[error("los productos no pueden pertenecer a la colección \"Todas\"")]
    SentinelCollection,
}

/// Unvalidated product input, as submitted by the editor form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub collection: String,
    pub price: String,
    pub description: String,
    pub material: String,
    pub image_url: String,
}

impl ProductDraft {
    /// Validate the draft and turn it into a product with the given id.
    ///
    /// `name`, `price`, `category` and `collection` are required; a blank
    /// `material` means the product has none. Classification references are
    /// checked by the store against the current lists, not here.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] naming the first blank
    /// required field.
    pub fn validate(self, id: ProductId) -> Result<Product, ValidationError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ValidationError::MissingField("nombre"));
        }
        let price = self.price.trim().to_owned();
        if price.is_empty() {
            return Err(ValidationError::MissingField("precio"));
        }
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(ValidationError::MissingField("categoría"));
        }
        let collection = self.collection.trim().to_owned();
        if collection.is_empty() {
            return Err(ValidationError::MissingField("colección"));
        }

        Ok(Product {
            id,
            name,
            category,
            collection,
            price,
            description: self.description.trim().to_owned(),
            material: self.material.trim().to_owned(),
            image_url: self.image_url.trim().to_owned(),
        })
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            collection: product.collection.clone(),
            price: product.price.clone(),
            description: product.description.clone(),
            material: product.material.clone(),
            image_url: product.image_url.clone(),
        }
    }
}
