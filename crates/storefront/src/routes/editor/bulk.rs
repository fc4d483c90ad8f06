//! Bulk actions on the products selected in the inventory table.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use lumina_core::{ClassificationKind, PriceChange, ProductId};
use rust_decimal::Decimal;

use super::{DASHBOARD_PATH, shop_error_redirect};
use crate::middleware::RequireEditor;
use crate::routes::{redirect_with_error, redirect_with_success};
use crate::shop::BulkOutcome;
use crate::state::AppState;

/// A parsed bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOperation {
    Price(PriceChange),
    Move {
        kind: ClassificationKind,
        to: String,
    },
    Delete,
}

/// The submitted bulk form. Checkboxes repeat the `ids` key, which
/// `serde_urlencoded` cannot collect, so the body is parsed by hand.
#[derive(Debug, Default)]
pub struct BulkForm {
    pub ids: Vec<ProductId>,
    pub operation: String,
    pub value: String,
    pub target_collection: String,
    pub target_category: String,
    pub target_material: String,
}

impl BulkForm {
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "ids" => form.ids.extend(ProductId::parse(&value)),
                "operation" => form.operation = value.into_owned(),
                "value" => form.value = value.into_owned(),
                "target_collection" => form.target_collection = value.into_owned(),
                "target_category" => form.target_category = value.into_owned(),
                "target_material" => form.target_material = value.into_owned(),
                _ => {}
            }
        }
        form
    }

    /// Resolve the chosen operation, or a user-facing reason it is invalid.
    ///
    /// # Errors
    ///
    /// A Spanish message for an unknown operation, an unparseable amount or
    /// a missing move target.
    pub fn operation(&self) -> Result<BulkOperation, String> {
        let amount = || {
            self.value
                .trim()
                .replace(',', ".")
                .parse::<Decimal>()
                .map_err(|_| "Introduce un valor numérico válido.".to_string())
        };
        let target = |kind: ClassificationKind, value: &str| {
            let to = value.trim();
            if to.is_empty() {
                Err(format!("Selecciona un destino en {}.", kind.plural_label()))
            } else {
                Ok(BulkOperation::Move {
                    kind,
                    to: to.to_owned(),
                })
            }
        };

        match self.operation.as_str() {
            "price_set" => {
                let price = amount()?;
                if price.is_sign_negative() {
                    return Err("El precio no puede ser negativo.".to_string());
                }
                Ok(BulkOperation::Price(PriceChange::Set(price)))
            }
            "price_percent" => Ok(BulkOperation::Price(PriceChange::AdjustPercent(amount()?))),
            "move_collection" => target(ClassificationKind::Collection, &self.target_collection),
            "move_category" => target(ClassificationKind::Category, &self.target_category),
            "move_material" => target(ClassificationKind::Material, &self.target_material),
            "delete" => Ok(BulkOperation::Delete),
            _ => Err("Selecciona una acción.".to_string()),
        }
    }
}

fn outcome_redirect(outcome: &BulkOutcome) -> Response {
    tracing::info!(
        action = ?outcome.action,
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        skipped = outcome.skipped.len(),
        "Bulk action finished"
    );
    if outcome.has_failures() {
        redirect_with_error(DASHBOARD_PATH, &outcome.summary()).into_response()
    } else {
        redirect_with_success(DASHBOARD_PATH, &outcome.summary()).into_response()
    }
}

/// Apply one action to every selected product.
pub async fn apply(
    State(state): State<AppState>,
    RequireEditor(_editor): RequireEditor,
    body: Bytes,
) -> Response {
    let form = BulkForm::parse(&body);
    if form.ids.is_empty() {
        return redirect_with_error(DASHBOARD_PATH, "Selecciona al menos un producto.")
            .into_response();
    }

    let operation = match form.operation() {
        Ok(operation) => operation,
        Err(message) => return redirect_with_error(DASHBOARD_PATH, &message).into_response(),
    };

    let shop = state.shop();
    match operation {
        BulkOperation::Price(change) => {
            outcome_redirect(&shop.bulk_update_prices(&form.ids, change).await)
        }
        BulkOperation::Move { kind, to } => match shop.bulk_move(&form.ids, kind, &to).await {
            Ok(outcome) => outcome_redirect(&outcome),
            Err(e) => shop_error_redirect(DASHBOARD_PATH, &e).into_response(),
        },
        BulkOperation::Delete => outcome_redirect(&shop.bulk_delete(&form.ids).await),
    }
}
