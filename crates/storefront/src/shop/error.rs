//! Shop store error types.

use lumina_core::{CatalogError, ClassificationKind, ProductId, ValidationError};
use thiserror::Error;

use crate::supabase::RemoteError;

/// A mutation the store can perform, used to pick the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddProduct,
    UpdateProduct,
    DeleteProduct,
    AddClassification(ClassificationKind),
    UpdateClassification(ClassificationKind),
    DeleteClassification(ClassificationKind),
    UpdateSiteConfig,
    Reset,
    BulkUpdate,
    BulkDelete,
}

impl Action {
    /// Alert text shown when the remote call for this action fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        use ClassificationKind::{Category, Collection, Material};
        match self {
            Self::AddProduct => "Error al guardar el producto. Por favor intenta de nuevo.",
            Self::UpdateProduct | Self::BulkUpdate => {
                "Error al actualizar el producto. Por favor intenta de nuevo."
            }
            Self::DeleteProduct | Self::BulkDelete => {
                "Error al eliminar el producto. Por favor intenta de nuevo."
            }
            Self::AddClassification(Collection) => {
                "Error al añadir la colección. Por favor intenta de nuevo."
            }
            Self::AddClassification(Category) => {
                "Error al añadir la categoría. Por favor intenta de nuevo."
            }
            Self::AddClassification(Material) => {
                "Error al añadir el material. Por favor intenta de nuevo."
            }
            Self::UpdateClassification(Collection) => {
                "Error al actualizar la colección. Por favor intenta de nuevo."
            }
            Self::UpdateClassification(Category) => {
                "Error al actualizar la categoría. Por favor intenta de nuevo."
            }
            Self::UpdateClassification(Material) => {
                "Error al actualizar el material. Por favor intenta de nuevo."
            }
            Self::DeleteClassification(Collection) => {
                "Error al eliminar la colección. Por favor intenta de nuevo."
            }
            Self::DeleteClassification(Category) => {
                "Error al eliminar la categoría. Por favor intenta de nuevo."
            }
            Self::DeleteClassification(Material) => {
                "Error al eliminar el material. Por favor intenta de nuevo."
            }
            Self::UpdateSiteConfig => {
                "Error al actualizar la configuración. Por favor intenta de nuevo."
            }
            Self::Reset => "Error al restablecer el sitio.",
        }
    }
}

/// Errors returned by shop store mutations.
///
/// Every variant leaves the in-memory catalog exactly as it was before the
/// call.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The remote store rejected or never received the change; the
    /// optimistic update was rolled back.
    #[error("{action:?} failed remotely: {source}")]
    Remote {
        action: Action,
        #[source]
        source: RemoteError,
    },

    /// The input was rejected before any state change.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Duplicate(String),

    /// Renaming or deleting the "Todas" collection.
    #[error("the \"Todas\" collection is protected")]
    Protected,

    /// Nothing left to reassign the products of a deleted entry to.
    #[error("no fallback for {kind} \"{name}\"")]
    NoFallback {
        kind: ClassificationKind,
        name: String,
    },
}

impl ShopError {
    /// Message suitable for showing to the editor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { action, .. } => action.failure_message().to_owned(),
            Self::Validation(err) => format!("No se pudo guardar: {err}."),
            Self::NotFound(what) => format!("No se encontró {what}."),
            Self::Duplicate(what) => format!("Ya existe {what}."),
            Self::Protected => "La colección \"Todas\" no se puede renombrar ni eliminar.".to_owned(),
            Self::NoFallback { kind, name } => format!(
                "No se puede eliminar \"{name}\": no queda ningún otro elemento en {} al que mover sus productos.",
                kind.plural_label()
            ),
        }
    }

    pub(crate) fn product_not_found(id: &ProductId) -> Self {
        Self::NotFound(format!("el producto {id}"))
    }
}

impl From<CatalogError> for ShopError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateProduct(id) => Self::Duplicate(format!("el producto {id}")),
            CatalogError::ProductNotFound(id) => Self::product_not_found(&id),
            CatalogError::NotFound { kind, name } => {
                Self::NotFound(format!("{} \"{name}\"", kind.label()))
            }
            CatalogError::Duplicate { kind, name } => {
                Self::Duplicate(format!("{} \"{name}\"", kind.label()))
            }
            CatalogError::Protected => Self::Protected,
            CatalogError::NoFallback { kind, name } => Self::NoFallback { kind, name },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_message() {
        let err = ShopError::Remote {
            action: Action::UpdateClassification(ClassificationKind::Collection),
            source: RemoteError::Injected("test".to_string()),
        };
        assert_eq!(
            err.user_message(),
            "Error al actualizar la colección. Por favor intenta de nuevo."
        );
    }

    #[test]
    fn test_catalog_error_mapping() {
        assert!(matches!(
            ShopError::from(CatalogError::Protected),
            ShopError::Protected
        ));
        let err = ShopError::from(CatalogError::Duplicate {
            kind: ClassificationKind::Category,
            name: "Aretes".to_string(),
        });
        assert_eq!(err.user_message(), "Ya existe categoría \"Aretes\".");
    }
}
