//! Pure calculators for category subtotals and the combined summary.
//!
//! Both functions take the sheet state and one `GlobalParameters` value by
//! reference; a single exchange rate is in effect for every conversion within
//! one pass.

use chrono::Utc;
use log::error;
use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::costsheet::CostCategory;
use crate::errors::{CalculatorError, Error, Result};
use crate::fx::{convert_amount, BASE_CURRENCY};
use crate::settings::GlobalParameters;

use super::valuation_model::{CategoryValuation, CostSummary};

/// Computes one category's valuation.
///
/// Every line total is normalized to the base currency regardless of its own
/// tag, then the safety margin (where the category carries it) and the tax
/// gross-up (where the subtotal is tax-exclusive) are applied: margin
/// strictly before tax, both in base currency, so the reporting currency
/// never changes the economic result, only its presentation.
pub fn calculate_category_valuation(
    category: &CostCategory,
    globals: &GlobalParameters,
) -> Result<CategoryValuation> {
    let rate = globals.exchange_rate();

    let mut base_subtotal = Decimal::ZERO;
    for line in category.lines() {
        // A negative stored total means derived state is corrupt; fail loudly
        // naming the line rather than folding it into the sum.
        if line.total() < Decimal::ZERO {
            error!(
                "Aggregation failed for category '{}': line {} carries negative total {}",
                category.key(),
                line.id(),
                line.total()
            );
            return Err(Error::Calculation(CalculatorError::NegativeLineTotal {
                line_id: line.id().to_string(),
                total: line.total(),
            }));
        }
        base_subtotal += convert_amount(line.total(), line.currency(), BASE_CURRENCY, rate)?;
    }

    if category.margin_applies() {
        base_subtotal *= Decimal::ONE + globals.margin_percentage();
    }

    if !category.includes_tax() {
        base_subtotal *= Decimal::ONE + globals.tax_rate();
    }

    let subtotal_base = base_subtotal.round_dp(DECIMAL_PRECISION);
    let subtotal_reporting =
        convert_amount(subtotal_base, BASE_CURRENCY, category.reporting_currency(), rate)?
            .round_dp(DECIMAL_PRECISION);

    Ok(CategoryValuation {
        key: category.key(),
        reporting_currency: category.reporting_currency(),
        subtotal_reporting,
        subtotal_base,
    })
}

/// Computes the combined summary for the whole sheet.
///
/// The base total is the sum of the per-category base subtotals; reporting
/// and preferred currencies only affect display figures.
pub fn calculate_cost_summary(
    categories: &[CostCategory],
    globals: &GlobalParameters,
) -> Result<CostSummary> {
    let mut category_valuations = Vec::with_capacity(categories.len());
    let mut base_total = Decimal::ZERO;

    for category in categories {
        let valuation = calculate_category_valuation(category, globals)?;
        base_total += valuation.subtotal_base;
        category_valuations.push(valuation);
    }

    let display_currency = globals.preferred_currency();
    let display_total =
        convert_amount(base_total, BASE_CURRENCY, display_currency, globals.exchange_rate())?
            .round_dp(DECIMAL_PRECISION);

    Ok(CostSummary {
        base_total,
        display_total,
        display_currency,
        categories: category_valuations,
        calculated_at: Utc::now(),
    })
}
