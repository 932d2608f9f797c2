//! Amount type for the API boundary
//!
//! `StrictDecimal` only deserializes from a JSON string and runs it through
//! [`crate::money::parse_amount`], so handlers never see a float, a negative
//! value or an over-precise amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// Format-validated, non-negative amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    pub fn inner(self) -> Decimal {
        self.0
    }

    #[cfg(test)]
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // JSON numbers would go through f64
        let s = String::deserialize(deserializer)?;
        if s.starts_with('+') {
            return Err(D::Error::custom("Invalid format: + prefix not allowed"));
        }
        money::parse_amount(&s)
            .map(StrictDecimal)
            .map_err(D::Error::custom)
    }
}

impl Serialize for StrictDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.0)
    }
}
