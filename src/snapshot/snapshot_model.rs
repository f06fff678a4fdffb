//! Versioned persistence snapshot of the whole sheet.
//!
//! These are wire DTOs, deliberately separate from the domain model: lines
//! are stored flat (`unitPrice` or the `days`/`dailyRate` pair) and derived
//! totals are not stored at all; they are recomputed on load through the
//! same constructors every mutation goes through.

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::SNAPSHOT_SCHEMA_VERSION;
use crate::costsheet::{CategoryKey, CostCategory, CostLine, NewCostLine};
use crate::errors::{Error, Result, SnapshotError};
use crate::fx::Currency;
use crate::settings::GlobalParameters;

/// Serialized form of one cost line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLine {
    pub id: String,
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

impl SnapshotLine {
    pub fn from_line(line: &CostLine) -> Self {
        Self {
            id: line.id().to_string(),
            description: line.description().to_string(),
            code: line.code().map(str::to_string),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            days: line.days(),
            daily_rate: line.daily_rate(),
            currency: line.currency(),
        }
    }

    /// Rebuilds the domain line, rejecting payloads that dispatch to neither
    /// line kind (or to both).
    pub fn into_line(self) -> Result<CostLine> {
        let line_id = self.id.clone();
        let input = NewCostLine {
            id: Some(self.id),
            description: self.description,
            code: self.code,
            quantity: self.quantity,
            unit_price: self.unit_price,
            days: self.days,
            daily_rate: self.daily_rate,
            currency: self.currency,
        };
        input.into_line().map_err(|err| {
            Error::Snapshot(SnapshotError::Malformed(format!(
                "line '{}': {}",
                line_id, err
            )))
        })
    }
}

/// Serialized form of one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCategory {
    pub key: CategoryKey,
    pub reporting_currency: Currency,
    pub includes_tax: bool,
    pub lines: Vec<SnapshotLine>,
}

impl SnapshotCategory {
    pub fn from_category(category: &CostCategory) -> Self {
        Self {
            key: category.key(),
            reporting_currency: category.reporting_currency(),
            includes_tax: category.includes_tax(),
            lines: category.lines().iter().map(SnapshotLine::from_line).collect(),
        }
    }

    /// Rebuilds the domain category. The margin flag is fixed at
    /// construction and derived from the key, so it never travels.
    pub fn into_category(self) -> Result<CostCategory> {
        let mut category = CostCategory::new(
            self.key,
            self.reporting_currency,
            self.includes_tax,
            self.key.default_margin_applies(),
        );
        for line in self.lines {
            category.add_line(line.into_line()?)?;
        }
        Ok(category)
    }
}

/// The full serializable state of the sheet at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostSheetSnapshot {
    pub version: u32,
    #[serde(default)]
    pub saved_at: NaiveDateTime,
    pub categories: Vec<SnapshotCategory>,
    pub globals: GlobalParameters,
}

impl CostSheetSnapshot {
    /// Captures the current sheet state under the current schema version.
    pub fn capture(categories: &[CostCategory], globals: &GlobalParameters) -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: Utc::now().naive_utc(),
            categories: categories.iter().map(SnapshotCategory::from_category).collect(),
            globals: globals.clone(),
        }
    }

    /// Rejects snapshots written under any other schema version.
    pub fn ensure_supported_version(&self) -> Result<()> {
        if self.version != SNAPSHOT_SCHEMA_VERSION {
            return Err(Error::Snapshot(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            }));
        }
        Ok(())
    }

    /// Rebuilds the domain state, re-validating everything the wire could
    /// have carried around the setters.
    pub fn into_parts(self) -> Result<(Vec<CostCategory>, GlobalParameters)> {
        self.ensure_supported_version()?;
        self.globals.validate()?;

        let mut categories = Vec::with_capacity(self.categories.len());
        for category in self.categories {
            categories.push(category.into_category()?);
        }
        Ok((categories, self.globals))
    }
}
