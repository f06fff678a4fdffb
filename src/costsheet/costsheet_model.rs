//! Cost sheet domain models.
//!
//! A sheet is five categories of priced lines. Every line keeps a derived
//! `total` that the mutation protocol recomputes synchronously; the only
//! other operation that touches it is the currency swap, which rescales the
//! stored price and total together so the line keeps its real-world value
//! under the new tag.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{Error, Result, ValidationError};
use crate::fx::{convert_amount, Currency};

/// The five cost categories of a production lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryKey {
    /// Components fabricated in-house or by the contract manufacturer.
    Fabrication,
    /// Components bought finished on the open market.
    PurchasedGoods,
    /// Wire and other raw stock. The only category carrying the safety margin.
    RawMaterial,
    /// Assembly and finishing crews, priced by headcount, days and day rate.
    Labor,
    /// Everything that fits nowhere else.
    Miscellaneous,
}

impl CategoryKey {
    /// Seed order of the sheet.
    pub fn all() -> [CategoryKey; 5] {
        [
            CategoryKey::Fabrication,
            CategoryKey::PurchasedGoods,
            CategoryKey::RawMaterial,
            CategoryKey::Labor,
            CategoryKey::Miscellaneous,
        ]
    }

    /// Stable key used on the wire and in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Fabrication => "fabrication",
            CategoryKey::PurchasedGoods => "purchasedGoods",
            CategoryKey::RawMaterial => "rawMaterial",
            CategoryKey::Labor => "labor",
            CategoryKey::Miscellaneous => "miscellaneous",
        }
    }

    /// Whether the safety margin applies to this category in the seeded
    /// sheet. Only raw material carries the cushion.
    pub fn default_margin_applies(&self) -> bool {
        matches!(self, CategoryKey::RawMaterial)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a line prices out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    /// Priced per unit.
    Simple { unit_price: Decimal },
    /// Priced by days worked and the daily rate; the line quantity is the
    /// headcount.
    Labor { days: Decimal, daily_rate: Decimal },
}

/// Atomic priced entry of a cost category.
///
/// `total` is derived and never independently settable.
#[derive(Debug, Clone, PartialEq)]
pub struct CostLine {
    id: String,
    description: String,
    code: Option<String>,
    quantity: Decimal,
    kind: LineKind,
    currency: Currency,
    total: Decimal,
}

impl CostLine {
    /// Creates a unit-priced line with a generated id.
    pub fn simple(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        currency: Currency,
    ) -> Result<Self> {
        Self::build(
            Uuid::new_v4().to_string(),
            description.into(),
            None,
            quantity,
            LineKind::Simple { unit_price },
            currency,
        )
    }

    /// Creates a labor line with a generated id. `quantity` is the headcount.
    pub fn labor(
        description: impl Into<String>,
        quantity: Decimal,
        days: Decimal,
        daily_rate: Decimal,
        currency: Currency,
    ) -> Result<Self> {
        Self::build(
            Uuid::new_v4().to_string(),
            description.into(),
            None,
            quantity,
            LineKind::Labor { days, daily_rate },
            currency,
        )
    }

    fn build(
        id: String,
        description: String,
        code: Option<String>,
        quantity: Decimal,
        kind: LineKind,
        currency: Currency,
    ) -> Result<Self> {
        ensure_non_negative("quantity", quantity)?;
        match kind {
            LineKind::Simple { unit_price } => ensure_non_negative("unit price", unit_price)?,
            LineKind::Labor { days, daily_rate } => {
                ensure_non_negative("days", days)?;
                ensure_non_negative("daily rate", daily_rate)?;
            }
        }

        let mut line = Self {
            id,
            description,
            code,
            quantity,
            kind,
            currency,
            total: Decimal::ZERO,
        };
        line.recompute_total();
        Ok(line)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The derived line total, in the line's own currency.
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn unit_price(&self) -> Option<Decimal> {
        match self.kind {
            LineKind::Simple { unit_price } => Some(unit_price),
            LineKind::Labor { .. } => None,
        }
    }

    pub fn days(&self) -> Option<Decimal> {
        match self.kind {
            LineKind::Simple { .. } => None,
            LineKind::Labor { days, .. } => Some(days),
        }
    }

    pub fn daily_rate(&self) -> Option<Decimal> {
        match self.kind {
            LineKind::Simple { .. } => None,
            LineKind::Labor { daily_rate, .. } => Some(daily_rate),
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_code(&mut self, code: Option<String>) {
        self.code = code;
    }

    pub fn set_quantity(&mut self, quantity: Decimal) -> Result<()> {
        ensure_non_negative("quantity", quantity)?;
        self.quantity = quantity;
        self.recompute_total();
        Ok(())
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) -> Result<()> {
        ensure_non_negative("unit price", unit_price)?;
        match &mut self.kind {
            LineKind::Simple { unit_price: price } => *price = unit_price,
            LineKind::Labor { .. } => {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "unit price does not apply to a labor line".to_string(),
                )))
            }
        }
        self.recompute_total();
        Ok(())
    }

    pub fn set_days(&mut self, days: Decimal) -> Result<()> {
        ensure_non_negative("days", days)?;
        match &mut self.kind {
            LineKind::Labor { days: d, .. } => *d = days,
            LineKind::Simple { .. } => {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "days do not apply to a unit-priced line".to_string(),
                )))
            }
        }
        self.recompute_total();
        Ok(())
    }

    pub fn set_daily_rate(&mut self, daily_rate: Decimal) -> Result<()> {
        ensure_non_negative("daily rate", daily_rate)?;
        match &mut self.kind {
            LineKind::Labor { daily_rate: rate, .. } => *rate = daily_rate,
            LineKind::Simple { .. } => {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "daily rate does not apply to a unit-priced line".to_string(),
                )))
            }
        }
        self.recompute_total();
        Ok(())
    }

    /// Re-tags the line and rescales its price field and total by the exact
    /// conversion the swap implies, preserving the line's real-world value.
    ///
    /// Not the same as relabeling and recomputing: the price itself moves to
    /// the new currency. Swapping back at the same rate restores the original
    /// figures up to Decimal rounding. Lines with quantity zero still convert
    /// their price fields, so a later quantity edit prices in the right
    /// currency.
    pub fn set_currency(&mut self, new_currency: Currency, exchange_rate: Decimal) -> Result<()> {
        if new_currency == self.currency {
            return Ok(());
        }

        let converted_total = convert_amount(self.total, self.currency, new_currency, exchange_rate)?;
        match &mut self.kind {
            LineKind::Simple { unit_price } => {
                *unit_price = convert_amount(*unit_price, self.currency, new_currency, exchange_rate)?;
            }
            LineKind::Labor { daily_rate, .. } => {
                *daily_rate = convert_amount(*daily_rate, self.currency, new_currency, exchange_rate)?;
            }
        }
        self.total = converted_total;
        self.currency = new_currency;
        Ok(())
    }

    fn recompute_total(&mut self) {
        self.total = match self.kind {
            LineKind::Simple { unit_price } => self.quantity * unit_price,
            LineKind::Labor { days, daily_rate } => self.quantity * days * daily_rate,
        };
    }
}

/// Input model for creating a new cost line.
///
/// Mirrors the flat wire shape: exactly one of `unit_price` or the
/// `days`/`daily_rate` pair must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCostLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_rate: Option<Decimal>,
    pub currency: Currency,
}

impl NewCostLine {
    /// Validates the kind dispatch without consuming the input.
    pub fn validate(&self) -> Result<()> {
        match (self.unit_price, self.days, self.daily_rate) {
            (Some(_), None, None) | (None, Some(_), Some(_)) => Ok(()),
            (None, None, None) => Err(Error::Validation(ValidationError::MissingField(
                "unitPrice or days/dailyRate".to_string(),
            ))),
            _ => Err(Error::Validation(ValidationError::InvalidInput(
                "a line takes either unitPrice or the days/dailyRate pair, not both".to_string(),
            ))),
        }
    }

    /// Builds the domain line, generating an id when none was supplied.
    pub fn into_line(self) -> Result<CostLine> {
        let kind = match (self.unit_price, self.days, self.daily_rate) {
            (Some(unit_price), None, None) => LineKind::Simple { unit_price },
            (None, Some(days), Some(daily_rate)) => LineKind::Labor { days, daily_rate },
            (None, None, None) => {
                return Err(Error::Validation(ValidationError::MissingField(
                    "unitPrice or days/dailyRate".to_string(),
                )))
            }
            _ => {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "a line takes either unitPrice or the days/dailyRate pair, not both"
                        .to_string(),
                )))
            }
        };

        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        CostLine::build(id, self.description, self.code, self.quantity, kind, self.currency)
    }
}

/// A keyed collection of cost lines with its own reporting configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CostCategory {
    key: CategoryKey,
    lines: Vec<CostLine>,
    reporting_currency: Currency,
    includes_tax: bool,
    /// Fixed at construction; the aggregation never flips it.
    margin_applies: bool,
}

impl CostCategory {
    pub fn new(
        key: CategoryKey,
        reporting_currency: Currency,
        includes_tax: bool,
        margin_applies: bool,
    ) -> Self {
        Self {
            key,
            lines: Vec::new(),
            reporting_currency,
            includes_tax,
            margin_applies,
        }
    }

    /// The default-seeded shape of a category: reporting in PEN, tax
    /// included, margin only on raw material.
    pub fn seeded(key: CategoryKey) -> Self {
        Self::new(key, Currency::Pen, true, key.default_margin_applies())
    }

    pub fn key(&self) -> CategoryKey {
        self.key
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CostLine] {
        &self.lines
    }

    pub fn reporting_currency(&self) -> Currency {
        self.reporting_currency
    }

    pub fn includes_tax(&self) -> bool {
        self.includes_tax
    }

    pub fn margin_applies(&self) -> bool {
        self.margin_applies
    }

    pub fn line(&self, line_id: &str) -> Option<&CostLine> {
        self.lines.iter().find(|line| line.id() == line_id)
    }

    pub(crate) fn line_mut(&mut self, line_id: &str) -> Option<&mut CostLine> {
        self.lines.iter_mut().find(|line| line.id() == line_id)
    }

    /// Appends a line, rejecting duplicate ids.
    pub fn add_line(&mut self, line: CostLine) -> Result<()> {
        if self.line(line.id()).is_some() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "line id '{}' already exists in category '{}'",
                line.id(),
                self.key
            ))));
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: &str) -> Result<CostLine> {
        match self.lines.iter().position(|line| line.id() == line_id) {
            Some(index) => Ok(self.lines.remove(index)),
            None => Err(Error::LineNotFound(line_id.to_string())),
        }
    }

    pub fn set_reporting_currency(&mut self, currency: Currency) {
        self.reporting_currency = currency;
    }

    pub fn set_includes_tax(&mut self, includes_tax: bool) {
        self.includes_tax = includes_tax;
    }
}

fn ensure_non_negative(field: &'static str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::NegativeValue {
            field,
            value,
        }));
    }
    Ok(())
}
