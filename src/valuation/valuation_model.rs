//! Valuation read models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::costsheet::CategoryKey;
use crate::fx::Currency;

/// One category's view of the sheet after normalization, margin, and tax.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValuation {
    pub key: CategoryKey,
    pub reporting_currency: Currency,
    /// Subtotal converted into the category's own reporting currency.
    pub subtotal_reporting: Decimal,
    /// Subtotal in the base currency; the figure the grand total sums.
    pub subtotal_base: Decimal,
}

/// The combined read model for the whole sheet.
///
/// Recomputed in full on every mutation and swapped in atomically, so a
/// reader never sees the grand total and the per-category rows disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    /// Grand total in the base currency.
    pub base_total: Decimal,
    /// Grand total converted into the preferred display currency.
    pub display_total: Decimal,
    pub display_currency: Currency,
    pub categories: Vec<CategoryValuation>,
    pub calculated_at: DateTime<Utc>,
}

impl CostSummary {
    pub fn category(&self, key: CategoryKey) -> Option<&CategoryValuation> {
        self.categories.iter().find(|valuation| valuation.key == key)
    }
}
