//! Collections, categories and materials.
//!
//! All three are `{ name, description }` records keyed by name, and products
//! reference them by name. [`ClassificationKind`] says which of the three a
//! record belongs to and carries everything that differs between them.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the synthetic "all products" collection.
///
/// It cannot be renamed or deleted and always sorts first.
pub const SENTINEL_COLLECTION: &str = "Todas";

/// A named classification entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub type CollectionData = Classification;
pub type CategoryData = Classification;
pub type MaterialData = Classification;

impl Classification {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Whether this is the "Todas" sentinel collection.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.name == SENTINEL_COLLECTION
    }

    /// Trim both fields. Returns `None` when the name is blank.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, self.description.trim()))
    }
}

/// Which classification list an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKind {
    Collection,
    Category,
    Material,
}

impl ClassificationKind {
    pub const ALL: [Self; 3] = [Self::Collection, Self::Category, Self::Material];

    /// Remote table holding this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Collection => "collections",
            Self::Category => "categories",
            Self::Material => "materials",
        }
    }

    /// Product column that references this kind by name.
    #[must_use]
    pub const fn product_column(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Category => "category",
            Self::Material => "material",
        }
    }

    /// URL segment used by the editor routes.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        self.table()
    }

    /// Singular label shown in the editor.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Collection => "colección",
            Self::Category => "categoría",
            Self::Material => "material",
        }
    }

    /// Plural label shown in the editor.
    #[must_use]
    pub const fn plural_label(self) -> &'static str {
        match self {
            Self::Collection => "Colecciones",
            Self::Category => "Categorías",
            Self::Material => "Materiales",
        }
    }

    /// Only collections have a protected sentinel entry.
    #[must_use]
    pub const fn has_sentinel(self) -> bool {
        matches!(self, Self::Collection)
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Unknown classification slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown classification kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ClassificationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}
