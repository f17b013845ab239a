//! Types library for the ITCH VWAP pipeline
//!
//! Core value types shared between the feed decoder and the aggregation
//! service. Wire-derived quantities keep their exchange encoding
//! (ten-thousandths prices, space-padded 8-byte symbols) so decoding is
//! lossless; display conversion happens only at report time.
//!
//! # Modules
//! - `ids`: exchange-assigned identifiers (StockLocate, OrderRef, MatchNumber)
//! - `numeric`: fixed-point price type (1e-4 resolution)
//! - `symbol`: 8-byte space-padded security symbol
//! - `order`: order side and live order tuple
//! - `trade`: matched trade print

pub mod ids;
pub mod numeric;
pub mod order;
pub mod symbol;
pub mod trade;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::symbol::*;
    pub use crate::trade::*;
}
