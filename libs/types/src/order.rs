//! Live order types
//!
//! An order enters the index on an add-order message and stays immutable
//! except through an order replace, which retires the original reference.
//! Cancels and deletes never reach this type; they cannot move a printed
//! execution.

use crate::ids::{OrderRef, StockLocate};
use crate::numeric::Price;
use serde::{Deserialize, Serialize};

/// Order side as carried on the wire ('B' or 'S').
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
    /// Any indicator byte other than 'B' or 'S'.
    Unknown,
}

impl Side {
    /// Map the wire indicator byte to a side.
    pub fn from_indicator(byte: u8) -> Self {
        match byte {
            b'B' => Side::Buy,
            b'S' => Side::Sell,
            _ => Side::Unknown,
        }
    }
}

/// A live order held in the reference-number index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub stock_locate: StockLocate,
    pub side: Side,
    pub shares: u32,
    pub price: Price,
    pub reference: OrderRef,
}

impl Order {
    /// Build the order created by a replace: same security and side, new
    /// size, price, and reference.
    pub fn replaced(&self, reference: OrderRef, shares: u32, price: Price) -> Self {
        Self {
            stock_locate: self.stock_locate,
            side: self.side,
            shares,
            price,
            reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_indicator() {
        assert_eq!(Side::from_indicator(b'B'), Side::Buy);
        assert_eq!(Side::from_indicator(b'S'), Side::Sell);
        assert_eq!(Side::from_indicator(b'X'), Side::Unknown);
    }

    #[test]
    fn test_replaced_preserves_locate_and_side() {
        let order = Order {
            stock_locate: StockLocate::new(7),
            side: Side::Buy,
            shares: 200,
            price: Price::from_raw(15050),
            reference: OrderRef::new(100),
        };

        let replaced = order.replaced(OrderRef::new(101), 50, Price::from_raw(20000));
        assert_eq!(replaced.stock_locate, StockLocate::new(7));
        assert_eq!(replaced.side, Side::Buy);
        assert_eq!(replaced.shares, 50);
        assert_eq!(replaced.price, Price::from_raw(20000));
        assert_eq!(replaced.reference, OrderRef::new(101));
    }
}
