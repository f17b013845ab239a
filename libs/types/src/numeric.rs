//! Fixed-point price type
//!
//! Feed prices travel as unsigned 32-bit integers holding ten-thousandths
//! of a currency unit (exactly 4 fractional digits). `Price` stores that
//! raw integer untouched; `rust_decimal` enters only at the display
//! boundary, so no precision is lost between decode and report.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional digits carried on the wire.
pub const PRICE_SCALE: u32 = 4;

/// A non-negative price with exactly 4 fractional digits.
///
/// Wraps the raw wire integer (price × 10⁴). Multiplying by a share count
/// is exact in integer arithmetic; conversion to `Decimal` is reserved for
/// formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u32);

impl Price {
    /// Zero price (used for unreported VWAPs).
    pub const ZERO: Price = Price(0);

    /// Create from the raw wire integer (ten-thousandths).
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw wire integer (ten-thousandths).
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Convert to a scale-4 `Decimal` for display.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(i64::from(self.0), PRICE_SCALE)
    }

    /// Try to convert a `Decimal` into a `Price`.
    ///
    /// Rescales to 4 fractional digits; returns `None` for negative values
    /// or values whose ten-thousandths exceed `u32::MAX`.
    pub fn try_from_decimal(value: Decimal) -> Option<Self> {
        let mut scaled = value;
        scaled.rescale(PRICE_SCALE);
        if scaled.is_sign_negative() {
            return None;
        }
        let mantissa = scaled.mantissa();
        if mantissa > i128::from(u32::MAX) {
            return None;
        }
        Some(Self(mantissa as u32))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

// Serialized as a decimal string to avoid JSON number precision loss.
impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_decimal().to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_from_decimal(decimal)
            .ok_or_else(|| serde::de::Error::custom("price out of range"))
    }
}
