//! Matched trade prints
//!
//! A trade is born on an execution, a non-cross print, or a cross print,
//! and dies only when a broken-trade message voids its match number.

use crate::ids::{MatchNumber, StockLocate};
use crate::numeric::Price;
use serde::{Deserialize, Serialize};

/// A printed trade held in the match-number ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub stock_locate: StockLocate,
    /// Cross prints carry 64-bit sizes; continuous prints widen into this.
    pub shares: u64,
    pub price: Price,
    pub match_number: MatchNumber,
}

impl Trade {
    /// Trade value in ten-thousandths of a currency unit.
    ///
    /// `u64 shares × u32 ten-thousandths` fits in 96 bits, so session-level
    /// accumulation in `u128` cannot overflow.
    pub fn notional_e4(&self) -> u128 {
        u128::from(self.shares) * u128::from(self.price.raw())
    }
}
