//! Exchange-assigned identifier types
//!
//! Every identifier on the feed is an integer handed out by the exchange:
//! the per-session stock locate, the order reference number, and the trade
//! match number. Newtypes keep them from being mixed up in map lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-session 16-bit handle for a security.
///
/// Assigned by the exchange in the stock directory; unique within one
/// trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLocate(u16);

impl StockLocate {
    /// Create from the raw wire value
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Get the raw wire value
    pub const fn raw(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for StockLocate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 64-bit order reference number.
///
/// Identifies a live order on the book; retired by an order replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(u64);

impl OrderRef {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 64-bit exchange-assigned identifier of a matched trade print.
///
/// A broken-trade message voids a previously reported print by this number,
/// so it is 64-bit everywhere it travels through the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchNumber(u64);

impl MatchNumber {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
