//! Currency domain type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// The base currency. Every aggregate is normalized to PEN before margin,
/// tax gross-up, and summation; reporting currencies only affect display.
pub const BASE_CURRENCY: Currency = Currency::Pen;

/// The two currencies cost lines are tracked in.
///
/// A closed enum: currency tags are flipped between the two members, never
/// free-typed, and conversion exists only through this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Peruvian sol.
    #[default]
    Pen,
    /// United States dollar.
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Pen => "PEN",
            Currency::Usd => "USD",
        }
    }

    /// Display prefix used on quotation sheets.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Pen => "S/",
            Currency::Usd => "$",
        }
    }

    /// The other member of the pair.
    pub fn toggled(&self) -> Currency {
        match self {
            Currency::Pen => Currency::Usd,
            Currency::Usd => Currency::Pen,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PEN" => Ok(Currency::Pen),
            "USD" => Ok(Currency::Usd),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown currency code '{}'",
                other
            )))),
        }
    }
}
