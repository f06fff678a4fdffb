//! Stateless currency conversion against an explicit exchange rate.
//!
//! The rate is always expressed in PEN per 1 USD. Callers pass the rate in on
//! every call; this module holds no state, so one rate value stays in effect
//! for the whole of any computation that threads it through.

use rust_decimal::Decimal;

use super::currency::Currency;
use super::fx_errors::FxError;

/// Converts `amount` from one currency to the other at `rate`.
///
/// Same-currency conversion is the identity and does not touch the rate.
/// USD to PEN multiplies by the rate; PEN to USD divides by it. A rate of
/// zero or below fails with [`FxError::InvalidRate`] rather than dividing
/// through.
pub fn convert_amount(
    amount: Decimal,
    from: Currency,
    to: Currency,
    rate: Decimal,
) -> Result<Decimal, FxError> {
    if from == to {
        return Ok(amount);
    }

    ensure_valid_rate(rate)?;

    match (from, to) {
        (Currency::Usd, Currency::Pen) => Ok(amount * rate),
        (Currency::Pen, Currency::Usd) => Ok(amount / rate),
        // Same-currency pairs returned above.
        (Currency::Pen, Currency::Pen) | (Currency::Usd, Currency::Usd) => Ok(amount),
    }
}

/// The factor a `from`-denominated amount is scaled by when re-tagged as
/// `to`. Used by the line currency swap, which rescales the stored price and
/// total by this exact factor.
pub fn conversion_factor(from: Currency, to: Currency, rate: Decimal) -> Result<Decimal, FxError> {
    convert_amount(Decimal::ONE, from, to, rate)
}

/// Rejects rates a conversion cannot be performed with.
pub fn ensure_valid_rate(rate: Decimal) -> Result<(), FxError> {
    if rate <= Decimal::ZERO {
        return Err(FxError::InvalidRate(format!(
            "rate must be positive, got {}",
            rate
        )));
    }
    Ok(())
}
