//! Display-formatted prices.
//!
//! Product prices are stored exactly as the editor typed them (for example
//! `"25.00 €"`). Sorting by price and bulk price edits need the numeric part,
//! so [`DisplayPrice`] splits a price string into prefix, decimal amount and
//! suffix, and formats it back preserving the original decoration.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Suffix used when a price has to be produced from scratch.
pub const DEFAULT_PRICE_SUFFIX: &str = " €";

/// A parsed display price.
///
/// ```rust
/// use lumina_core::DisplayPrice;
/// use rust_decimal::Decimal;
///
/// let price = DisplayPrice::parse("25,5 €").unwrap();
/// assert_eq!(price.amount(), Decimal::new(255, 1));
/// assert_eq!(price.to_string(), "25.50 €");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPrice {
    prefix: String,
    amount: Decimal,
    suffix: String,
}

impl DisplayPrice {
    /// Build a price with the default euro suffix.
    #[must_use]
    pub fn euros(amount: Decimal) -> Self {
        Self {
            prefix: String::new(),
            amount,
            suffix: DEFAULT_PRICE_SUFFIX.to_owned(),
        }
    }

    /// Parse a display price. Returns `None` when no number can be found.
    ///
    /// A decimal comma is accepted in place of a decimal point.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let first = raw.char_indices().find(|(_, c)| c.is_ascii_digit())?.0;
        let last = raw
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_ascii_digit())
            .map(|(i, c)| i + c.len_utf8())?;

        let number = raw.get(first..last)?.replace(',', ".");
        let amount = Decimal::from_str(&number).ok()?;

        Some(Self {
            prefix: raw.get(..first)?.to_owned(),
            amount,
            suffix: raw.get(last..)?.to_owned(),
        })
    }

    /// The numeric amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Same decoration, different amount.
    #[must_use]
    pub fn with_amount(&self, amount: Decimal) -> Self {
        Self {
            prefix: self.prefix.clone(),
            amount,
            suffix: self.suffix.clone(),
        }
    }
}

impl fmt::Display for DisplayPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.amount.round_dp(2);
        amount.rescale(2);
        write!(f, "{}{}{}", self.prefix, amount, self.suffix)
    }
}

/// A bulk price edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum PriceChange {
    /// Replace the amount, keeping the existing decoration when there is one.
    Set(Decimal),
    /// Increase (or decrease, if negative) the amount by a percentage.
    AdjustPercent(Decimal),
}

impl PriceChange {
    /// Apply the change to a display price string.
    ///
    /// Results are rounded to cents and clamped at zero. Returns `None` for a
    /// percentage adjustment of a price that has no numeric part, or one whose
    /// result does not fit in a [`Decimal`].
    #[must_use]
    pub fn apply(&self, price: &str) -> Option<String> {
        let parsed = DisplayPrice::parse(price);
        let updated = match (self, parsed) {
            (Self::Set(amount), Some(current)) => current.with_amount(*amount),
            (Self::Set(amount), None) => DisplayPrice::euros(*amount),
            (Self::AdjustPercent(percent), Some(current)) => {
                let factor = percent
                    .checked_div(Decimal::ONE_HUNDRED)?
                    .checked_add(Decimal::ONE)?;
                current.with_amount(current.amount().checked_mul(factor)?)
            }
            (Self::AdjustPercent(_), None) => return None,
        };

        let clamped = updated.amount().max(Decimal::ZERO).round_dp(2);
        Some(updated.with_amount(clamped).to_string())
    }
}
