//! Global costing parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EXCHANGE_RATE, DEFAULT_MARGIN_PERCENTAGE, DEFAULT_TAX_RATE};
use crate::errors::{ParameterError, Result};
use crate::fx::Currency;

fn default_tax_rate() -> Decimal {
    DEFAULT_TAX_RATE
}

/// Ambient parameters shared by every recompute.
///
/// One value of this struct is passed by reference into each calculation
/// pass, so a single exchange rate applies to every category within one
/// computation. Fields are only reachable through the validated setters;
/// snapshots that bypass them are re-checked with [`GlobalParameters::validate`]
/// at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParameters {
    /// Exchange rate in PEN per 1 USD.
    exchange_rate: Decimal,
    /// Safety margin applied to margin-bearing categories, e.g. 0.20 for 20%.
    margin_percentage: Decimal,
    /// Currency the combined grand total is displayed in.
    preferred_currency: Currency,
    /// Flat tax rate used to gross up tax-exclusive subtotals. Absent in
    /// snapshots written before the field existed.
    #[serde(default = "default_tax_rate")]
    tax_rate: Decimal,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            margin_percentage: DEFAULT_MARGIN_PERCENTAGE,
            preferred_currency: Currency::Pen,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl GlobalParameters {
    pub fn new(
        exchange_rate: Decimal,
        margin_percentage: Decimal,
        preferred_currency: Currency,
        tax_rate: Decimal,
    ) -> Result<Self> {
        let params = Self {
            exchange_rate,
            margin_percentage,
            preferred_currency,
            tax_rate,
        };
        params.validate()?;
        Ok(params)
    }

    /// Re-checks every field. Deserialized snapshots arrive without having
    /// passed through the setters.
    pub fn validate(&self) -> Result<()> {
        if self.exchange_rate <= Decimal::ZERO {
            return Err(ParameterError::InvalidExchangeRate(self.exchange_rate).into());
        }
        if self.margin_percentage < Decimal::ZERO {
            return Err(ParameterError::InvalidMarginPercentage(self.margin_percentage).into());
        }
        if self.tax_rate < Decimal::ZERO {
            return Err(ParameterError::InvalidTaxRate(self.tax_rate).into());
        }
        Ok(())
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn margin_percentage(&self) -> Decimal {
        self.margin_percentage
    }

    pub fn preferred_currency(&self) -> Currency {
        self.preferred_currency
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn set_exchange_rate(&mut self, rate: Decimal) -> Result<()> {
        if rate <= Decimal::ZERO {
            return Err(ParameterError::InvalidExchangeRate(rate).into());
        }
        self.exchange_rate = rate;
        Ok(())
    }

    pub fn set_margin_percentage(&mut self, margin: Decimal) -> Result<()> {
        if margin < Decimal::ZERO {
            return Err(ParameterError::InvalidMarginPercentage(margin).into());
        }
        self.margin_percentage = margin;
        Ok(())
    }

    pub fn set_tax_rate(&mut self, rate: Decimal) -> Result<()> {
        if rate < Decimal::ZERO {
            return Err(ParameterError::InvalidTaxRate(rate).into());
        }
        self.tax_rate = rate;
        Ok(())
    }

    pub fn set_preferred_currency(&mut self, currency: Currency) {
        self.preferred_currency = currency;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let params = GlobalParameters::default();
        assert_eq!(params.exchange_rate(), dec!(3.75));
        assert_eq!(params.margin_percentage(), dec!(0.02));
        assert_eq!(params.preferred_currency(), Currency::Pen);
        assert_eq!(params.tax_rate(), dec!(0.18));
    }

    #[test]
    fn test_rejects_non_positive_exchange_rate() {
        let mut params = GlobalParameters::default();
        assert!(matches!(
            params.set_exchange_rate(Decimal::ZERO),
            Err(Error::Parameter(ParameterError::InvalidExchangeRate(_)))
        ));
        assert!(params.set_exchange_rate(dec!(-3.75)).is_err());
        // Rejected updates leave the previous value in place.
        assert_eq!(params.exchange_rate(), dec!(3.75));
    }

    #[test]
    fn test_zero_margin_is_allowed() {
        let mut params = GlobalParameters::default();
        params.set_margin_percentage(Decimal::ZERO).unwrap();
        assert_eq!(params.margin_percentage(), Decimal::ZERO);
        assert!(params.set_margin_percentage(dec!(-0.1)).is_err());
    }

    #[test]
    fn test_tax_rate_defaults_when_missing_from_snapshot() {
        let json = r#"{
            "exchangeRate": 3.75,
            "marginPercentage": 0.25,
            "preferredCurrency": "USD"
        }"#;
        let params: GlobalParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.tax_rate(), dec!(0.18));
        assert_eq!(params.preferred_currency(), Currency::Usd);
    }

    #[test]
    fn test_validate_catches_deserialized_bad_rate() {
        let json = r#"{
            "exchangeRate": 0.0,
            "marginPercentage": 0.0,
            "preferredCurrency": "PEN"
        }"#;
        let params: GlobalParameters = serde_json::from_str(json).unwrap();
        assert!(params.validate().is_err());
    }
}
