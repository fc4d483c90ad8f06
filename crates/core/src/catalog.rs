//! The in-memory catalog and its pure operations.
//!
//! Nothing here performs I/O. The storefront's shop store applies these
//! operations as the optimistic step of a mutation and persists the same
//! change remotely afterwards.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{
    Classification, ClassificationKind, DisplayPrice, Product, ProductId, SENTINEL_COLLECTION,
    SiteConfig,
};

/// Why a catalog operation was refused. The catalog is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("product {0} already exists")]
    DuplicateProduct(ProductId),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("{kind} entry \"{name}\" not found")]
    NotFound {
        kind: ClassificationKind,
        name: String,
    },

    #[error("{kind} entry \"{name}\" already exists")]
    Duplicate {
        kind: ClassificationKind,
        name: String,
    },

    #[error("the \"{SENTINEL_COLLECTION}\" collection cannot be renamed or deleted")]
    Protected,

    #[error("no {kind} entry left to reassign products of \"{name}\" to")]
    NoFallback {
        kind: ClassificationKind,
        name: String,
    },
}

/// A product field pointing at a classification that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub product: ProductId,
    pub kind: ClassificationKind,
    pub value: String,
}

/// Complete catalog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub collections: Vec<Classification>,
    pub categories: Vec<Classification>,
    pub materials: Vec<Classification>,
    pub site_config: SiteConfig,
}

impl Catalog {
    /// The classification list for `kind`.
    #[must_use]
    pub fn classifications(&self, kind: ClassificationKind) -> &[Classification] {
        match kind {
            ClassificationKind::Collection => &self.collections,
            ClassificationKind::Category => &self.categories,
            ClassificationKind::Material => &self.materials,
        }
    }

    fn classifications_mut(&mut self, kind: ClassificationKind) -> &mut Vec<Classification> {
        match kind {
            ClassificationKind::Collection => &mut self.collections,
            ClassificationKind::Category => &mut self.categories,
            ClassificationKind::Material => &mut self.materials,
        }
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn contains(&self, kind: ClassificationKind, name: &str) -> bool {
        self.classifications(kind).iter().any(|c| c.name == name)
    }

    /// Append a new product.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateProduct`] when the id is taken.
    pub fn insert_product(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.product(&product.id).is_some() {
            return Err(CatalogError::DuplicateProduct(product.id));
        }
        self.products.push(product);
        Ok(())
    }

    /// Replace the product with the same id, returning the previous value.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ProductNotFound`] when no product has that id.
    pub fn replace_product(&mut self, product: Product) -> Result<Product, CatalogError> {
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| CatalogError::ProductNotFound(product.id.clone()))?;
        Ok(std::mem::replace(slot, product))
    }

    /// Remove a product by id.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ProductNotFound`] when no product has that id.
    pub fn remove_product(&mut self, id: &ProductId) -> Result<Product, CatalogError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))?;
        Ok(self.products.remove(index))
    }

    /// Add a classification entry, keeping the list sorted.
    ///
    /// Returns `false` (and changes nothing) when the name is already present.
    pub fn add_classification(&mut self, kind: ClassificationKind, data: Classification) -> bool {
        if self.contains(kind, &data.name) {
            return false;
        }
        let list = self.classifications_mut(kind);
        list.push(data);
        sort_classifications(kind, list);
        true
    }

    /// Replace the entry named `original` with `data`.
    ///
    /// When the name changes every product referencing `original` is rewritten
    /// to the new name. Returns the number of rewritten products.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] when `original` does not exist.
    /// - [`CatalogError::Protected`] when renaming the sentinel collection.
    /// - [`CatalogError::Duplicate`] when the new name is already taken.
    pub fn replace_classification(
        &mut self,
        kind: ClassificationKind,
        original: &str,
        data: Classification,
    ) -> Result<usize, CatalogError> {
        if !self.contains(kind, original) {
            return Err(CatalogError::NotFound {
                kind,
                name: original.to_owned(),
            });
        }

        let renamed = data.name != original;
        if renamed {
            if kind.has_sentinel() && (original == SENTINEL_COLLECTION || data.is_sentinel()) {
                return Err(CatalogError::Protected);
            }
            if self.contains(kind, &data.name) {
                return Err(CatalogError::Duplicate {
                    kind,
                    name: data.name,
                });
            }
        }

        let rewritten = if renamed {
            self.reassign_products(kind, original, &data.name)
        } else {
            0
        };

        let list = self.classifications_mut(kind);
        if let Some(entry) = list.iter_mut().find(|c| c.name == original) {
            *entry = data;
        }
        if renamed {
            sort_classifications(kind, list);
        }
        Ok(rewritten)
    }

    /// Remove the entry named `name`, moving its products to `fallback`.
    ///
    /// Returns the number of reassigned products.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Protected`] for the sentinel collection.
    /// - [`CatalogError::NotFound`] when `name` does not exist.
    /// - [`CatalogError::NoFallback`] when products still reference `name`
    ///   and no fallback was given.
    pub fn remove_classification(
        &mut self,
        kind: ClassificationKind,
        name: &str,
        fallback: Option<&str>,
    ) -> Result<usize, CatalogError> {
        if kind.has_sentinel() && name == SENTINEL_COLLECTION {
            return Err(CatalogError::Protected);
        }
        if !self.contains(kind, name) {
            return Err(CatalogError::NotFound {
                kind,
                name: name.to_owned(),
            });
        }

        let referenced = self.products_referencing(kind, name).count();
        let moved = match fallback {
            Some(to) => self.reassign_products(kind, name, to),
            None if referenced == 0 => 0,
            None => {
                return Err(CatalogError::NoFallback {
                    kind,
                    name: name.to_owned(),
                });
            }
        };

        self.classifications_mut(kind).retain(|c| c.name != name);
        Ok(moved)
    }

    /// First entry in list order that is neither the sentinel nor `name`.
    #[must_use]
    pub fn fallback_for(&self, kind: ClassificationKind, name: &str) -> Option<&str> {
        self.classifications(kind)
            .iter()
            .find(|c| c.name != name && !(kind.has_sentinel() && c.is_sentinel()))
            .map(|c| c.name.as_str())
    }

    /// Products whose `kind` field equals `value`.
    pub fn products_referencing<'a>(
        &'a self,
        kind: ClassificationKind,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |p| product_field(p, kind) == value)
    }

    fn reassign_products(&mut self, kind: ClassificationKind, from: &str, to: &str) -> usize {
        let mut count = 0;
        for product in &mut self.products {
            let field = product_field_mut(product, kind);
            if *field == *from {
                to.clone_into(field);
                count += 1;
            }
        }
        count
    }

    /// Every product field that names a missing classification.
    ///
    /// Blank fields are not references and are ignored.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for product in &self.products {
            for kind in ClassificationKind::ALL {
                let value = product_field(product, kind);
                if !value.is_empty() && !self.contains(kind, value) {
                    dangling.push(DanglingReference {
                        product: product.id.clone(),
                        kind,
                        value: value.to_owned(),
                    });
                }
            }
        }
        dangling
    }

    /// Add an empty-description entry for every dangling reference so the
    /// catalog is consistent again. Returns the added entries.
    pub fn adopt_dangling(&mut self) -> Vec<(ClassificationKind, Classification)> {
        let mut adopted: Vec<(ClassificationKind, Classification)> = Vec::new();
        for reference in self.dangling_references() {
            let entry = Classification::new(reference.value, "");
            if self.add_classification(reference.kind, entry.clone()) {
                adopted.push((reference.kind, entry));
            }
        }
        adopted
    }

    /// Sort every classification list.
    pub fn sort_all(&mut self) {
        for kind in ClassificationKind::ALL {
            sort_classifications(kind, self.classifications_mut(kind));
        }
    }
}

/// The field of `product` that references `kind`.
#[must_use]
pub fn product_field(product: &Product, kind: ClassificationKind) -> &str {
    match kind {
        ClassificationKind::Collection => &product.collection,
        ClassificationKind::Category => &product.category,
        ClassificationKind::Material => &product.material,
    }
}

/// Mutable access to the field of `product` that references `kind`.
pub fn product_field_mut(product: &mut Product, kind: ClassificationKind) -> &mut String {
    match kind {
        ClassificationKind::Collection => &mut product.collection,
        ClassificationKind::Category => &mut product.category,
        ClassificationKind::Material => &mut product.material,
    }
}

/// Lowercase and strip Spanish/Latin diacritics for collation and search.
#[must_use]
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Accent- and case-insensitive ordering; ties broken by the raw text so
/// the order is total.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Sort a classification list by name. Collections get the sentinel first,
/// inserted when missing.
pub fn sort_classifications(kind: ClassificationKind, list: &mut Vec<Classification>) {
    list.sort_by(|a, b| collate(&a.name, &b.name));
    if !kind.has_sentinel() {
        return;
    }
    match list.iter().position(Classification::is_sentinel) {
        Some(index) => {
            let sentinel = list.remove(index);
            list.insert(0, sentinel);
        }
        None => list.insert(0, Classification::new(SENTINEL_COLLECTION, "")),
    }
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first. Products are kept oldest first, so this reverses.
    #[default]
    Newest,
    NameAsc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::Newest, Self::NameAsc, Self::PriceAsc, Self::PriceDesc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::NameAsc => "name_asc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Novedades",
            Self::NameAsc => "Nombre (A-Z)",
            Self::PriceAsc => "Precio: menor a mayor",
            Self::PriceDesc => "Precio: mayor a menor",
        }
    }
}

/// Public catalog filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// A titled group of products in the "Todas" view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub collection: &'a Classification,
    pub products: Vec<&'a Product>,
}

impl CatalogQuery {
    /// Selected collection, treating blank and the sentinel as "no filter".
    #[must_use]
    pub fn selected_collection(&self) -> Option<&str> {
        non_blank(self.collection.as_deref()).filter(|c| *c != SENTINEL_COLLECTION)
    }

    fn matches(&self, product: &Product) -> bool {
        if !field_matches(self.selected_collection(), &product.collection)
            || !field_matches(non_blank(self.category.as_deref()), &product.category)
            || !field_matches(non_blank(self.material.as_deref()), &product.material)
        {
            return false;
        }

        non_blank(self.search.as_deref()).is_none_or(|needle| {
            let needle = fold(needle);
            [&product.name, &product.description, &product.material]
                .iter()
                .any(|haystack| fold(haystack).contains(&needle))
        })
    }

    /// Filtered and sorted products.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut found: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            SortOrder::Newest => found.reverse(),
            SortOrder::NameAsc => found.sort_by(|a, b| collate(&a.name, &b.name)),
            SortOrder::PriceAsc => found.sort_by(|a, b| compare_prices(a, b)),
            SortOrder::PriceDesc => found.sort_by(|a, b| compare_prices(b, a)),
        }
        found
    }

    /// One section per non-sentinel collection, in list order, skipping
    /// collections with no matching products.
    #[must_use]
    pub fn sections<'a>(&self, catalog: &'a Catalog) -> Vec<Section<'a>> {
        let matching = self.apply(&catalog.products);
        catalog
            .collections
            .iter()
            .filter(|c| !c.is_sentinel())
            .filter(|c| self.selected_collection().is_none_or(|s| s == c.name))
            .filter_map(|collection| {
                let products: Vec<&Product> = matching
                    .iter()
                    .copied()
                    .filter(|p| p.collection == collection.name)
                    .collect();
                (!products.is_empty()).then_some(Section {
                    collection,
                    products,
                })
            })
            .collect()
    }
}

/// Products without a numeric price sort last.
fn compare_prices(a: &Product, b: &Product) -> Ordering {
    let amount = |p: &Product| DisplayPrice::parse(&p.price).map(|d| d.amount());
    match (amount(a), amount(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn field_matches(filter: Option<&str>, value: &str) -> bool {
    filter.is_none_or(|f| f == value)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::defaults;

    fn ring() -> Product {
        Product {
            id: ProductId::parse("1").unwrap(),
            name: "Ring".to_string(),
            category: "Anillos".to_string(),
            collection: "Aurora".to_string(),
            price: "10.00 €".to_string(),
            description: String::new(),
            material: "Gold".to_string(),
            image_url: String::new(),
        }
    }

    fn small_catalog() -> Catalog {
        let mut catalog = Catalog {
            products: vec![ring()],
            collections: vec![
                Classification::new("Todas", ""),
                Classification::new("Aurora", "a"),
                Classification::new("Nocturna", "n"),
            ],
            categories: vec![Classification::new("Anillos", "")],
            materials: vec![Classification::new("Gold", "")],
            site_config: defaults::site_config(),
        };
        catalog.sort_all();
        catalog
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut catalog = small_catalog();
        let err = catalog.insert_product(ring()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateProduct(_)));
        assert_eq!(catalog.products.len(), 1);
    }

    #[test]
    fn test_replace_and_remove_unknown() {
        let mut catalog = small_catalog();
        let mut other = ring();
        other.id = ProductId::parse("2").unwrap();
        assert!(catalog.replace_product(other.clone()).is_err());
        assert!(catalog.remove_product(&other.id).is_err());
    }

    #[test]
    fn test_rename_cascades_to_products() {
        let mut catalog = small_catalog();
        let rewritten = catalog
            .replace_classification(
                ClassificationKind::Collection,
                "Aurora",
                Classification::new("Amanecer", "..."),
            )
            .unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(catalog.products[0].collection, "Amanecer");
        assert!(catalog.contains(ClassificationKind::Collection, "Amanecer"));
        assert!(!catalog.contains(ClassificationKind::Collection, "Aurora"));
        assert_eq!(catalog.collections[0].name, "Todas");
        assert!(catalog.dangling_references().is_empty());
    }

    #[test]
    fn test_description_only_update() {
        let mut catalog = small_catalog();
        let rewritten = catalog
            .replace_classification(
                ClassificationKind::Collection,
                "Todas",
                Classification::new("Todas", "todo"),
            )
            .unwrap();
        assert_eq!(rewritten, 0);
        assert_eq!(catalog.collections[0].description, "todo");
    }

    #[test]
    fn test_rename_rules() {
        let mut catalog = small_catalog();
        let before = catalog.clone();

        let protected = catalog.replace_classification(
            ClassificationKind::Collection,
            "Todas",
            Classification::new("Todo", ""),
        );
        assert_eq!(protected, Err(CatalogError::Protected));

        let duplicate = catalog.replace_classification(
            ClassificationKind::Collection,
            "Aurora",
            Classification::new("Nocturna", ""),
        );
        assert!(matches!(duplicate, Err(CatalogError::Duplicate { .. })));

        let missing = catalog.replace_classification(
            ClassificationKind::Category,
            "Pulseras",
            Classification::new("Brazaletes", ""),
        );
        assert!(matches!(missing, Err(CatalogError::NotFound { .. })));

        assert_eq!(catalog, before);
    }

    #[test]
    fn test_remove_reassigns_to_fallback() {
        let mut catalog = small_catalog();
        let fallback = catalog
            .fallback_for(ClassificationKind::Collection, "Aurora")
            .map(str::to_owned);
        assert_eq!(fallback.as_deref(), Some("Nocturna"));

        let moved = catalog
            .remove_classification(ClassificationKind::Collection, "Aurora", fallback.as_deref())
            .unwrap();
        assert_eq!(moved, 1);
        assert_eq!(catalog.products[0].collection, "Nocturna");
        assert!(!catalog.contains(ClassificationKind::Collection, "Aurora"));
    }

    #[test]
    fn test_remove_sentinel_is_protected() {
        let mut catalog = small_catalog();
        let result =
            catalog.remove_classification(ClassificationKind::Collection, "Todas", Some("Aurora"));
        assert_eq!(result, Err(CatalogError::Protected));
        assert_eq!(catalog, small_catalog());
    }

    #[test]
    fn test_remove_without_fallback() {
        let mut catalog = small_catalog();
        assert_eq!(
            catalog.fallback_for(ClassificationKind::Material, "Gold"),
            None
        );
        let result = catalog.remove_classification(ClassificationKind::Material, "Gold", None);
        assert!(matches!(result, Err(CatalogError::NoFallback { .. })));

        catalog.products.clear();
        let result = catalog.remove_classification(ClassificationKind::Material, "Gold", None);
        assert_eq!(result, Ok(0));
    }

    #[test]
    fn test_add_classification_skips_duplicates() {
        let mut catalog = small_catalog();
        assert!(!catalog.add_classification(
            ClassificationKind::Category,
            Classification::new("Anillos", "otra")
        ));
        assert!(catalog.add_classification(
            ClassificationKind::Category,
            Classification::new("Aretes", "")
        ));
        let names: Vec<&str> = catalog.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Anillos", "Aretes"]);
    }

    #[test]
    fn test_sort_accent_insensitive_with_sentinel_first() {
        let mut list = vec![
            Classification::new("Orgánica", ""),
            Classification::new("Nocturna", ""),
            Classification::new("Aurora", ""),
            Classification::new("Oro", ""),
        ];
        sort_classifications(ClassificationKind::Collection, &mut list);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Todas", "Aurora", "Nocturna", "Orgánica", "Oro"]);
    }

    #[test]
    fn test_dangling_references() {
        let mut catalog = small_catalog();
        catalog.products[0].material = "Plata".to_string();
        let dangling = catalog.dangling_references();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].kind, ClassificationKind::Material);
        assert_eq!(dangling[0].value, "Plata");

        let adopted = catalog.adopt_dangling();
        assert_eq!(adopted.len(), 1);
        assert!(catalog.contains(ClassificationKind::Material, "Plata"));
        assert!(catalog.dangling_references().is_empty());
    }

    #[test]
    fn test_query_filters_and_search() {
        let catalog = defaults::catalog();
        let query = CatalogQuery {
            collection: Some("Todas".to_string()),
            search: Some("PERLA".to_string()),
            ..CatalogQuery::default()
        };
        let found = query.apply(&catalog.products);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Collar Perla Irregular");

        let by_material = CatalogQuery {
            search: Some("acero inoxidable".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(by_material.apply(&catalog.products).len(), 2);

        let accents = CatalogQuery {
            search: Some("eslabon".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(accents.apply(&catalog.products).len(), 1);
    }

    #[test]
    fn test_query_sort_by_price() {
        let catalog = defaults::catalog();
        let query = CatalogQuery {
            sort: SortOrder::PriceDesc,
            ..CatalogQuery::default()
        };
        let found = query.apply(&catalog.products);
        assert_eq!(found[0].name, "Collar Cascadas");
        assert_eq!(found.last().unwrap().name, "Set de Anillos Midi");
    }

    #[test]
    fn test_newest_first() {
        let catalog = defaults::catalog();
        let found = CatalogQuery::default().apply(&catalog.products);
        assert_eq!(found[0].id.as_str(), "11");
    }

    #[test]
    fn test_sections_skip_empty_collections() {
        let mut catalog = defaults::catalog();
        catalog.add_classification(
            ClassificationKind::Collection,
            Classification::new("Vacía", ""),
        );
        let sections = CatalogQuery::default().sections(&catalog);
        let names: Vec<&str> = sections
            .iter()
            .map(|s| s.collection.name.as_str())
            .collect();
        assert_eq!(names, ["Aurora", "Nocturna", "Orgánica"]);
        assert_eq!(sections[0].products.len(), 4);
    }
}
