//! Typed feed messages
//!
//! The ten message shapes the pipeline consumes, as one tagged enum. The
//! decoder produces plain values of this type; nothing here touches
//! aggregator state. Each layout skips the 2-byte tracking number that
//! follows the stock locate on every type.
//!
//! Order cancel and delete messages are deliberately not represented:
//! cancels never move an execution, and erroneous prints are corrected by
//! the feed itself through broken-trade messages.

use serde::{Deserialize, Serialize};
use types::ids::{MatchNumber, OrderRef, StockLocate};
use types::numeric::Price;
use types::order::Side;
use types::symbol::Symbol;

use crate::wire::{Wire, WireError};

/// One decoded feed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message_type")]
pub enum ItchMessage {
    /// 'S': session-level event; 'Q' opens the market, 'M' closes it.
    SystemEvent {
        stock_locate: StockLocate,
        timestamp: u64,
        event_code: u8,
    },

    /// 'R': declares the locate ↔ symbol binding for one security.
    StockDirectory {
        stock_locate: StockLocate,
        timestamp: u64,
        symbol: Symbol,
    },

    /// 'A': a new order enters the book.
    AddOrder {
        stock_locate: StockLocate,
        timestamp: u64,
        reference: OrderRef,
        side: Side,
        shares: u32,
        symbol: Symbol,
        price: Price,
    },

    /// 'F': add order with participant attribution (attribution ignored).
    AddOrderMpid {
        stock_locate: StockLocate,
        timestamp: u64,
        reference: OrderRef,
        side: Side,
        shares: u32,
        symbol: Symbol,
        price: Price,
    },

    /// 'E': execution against a live order at that order's price.
    OrderExecuted {
        stock_locate: StockLocate,
        timestamp: u64,
        reference: OrderRef,
        executed_shares: u32,
        match_number: MatchNumber,
    },

    /// 'C': execution at an explicit price; counts only when printable.
    OrderExecutedWithPrice {
        stock_locate: StockLocate,
        timestamp: u64,
        reference: OrderRef,
        executed_shares: u32,
        match_number: MatchNumber,
        printable: bool,
        execution_price: Price,
    },

    /// 'U': atomic delete-original-insert-new under a fresh reference.
    OrderReplace {
        stock_locate: StockLocate,
        timestamp: u64,
        original: OrderRef,
        replacement: OrderRef,
        shares: u32,
        price: Price,
    },

    /// 'P': non-cross trade print (hidden or unattributed liquidity).
    Trade {
        stock_locate: StockLocate,
        timestamp: u64,
        shares: u32,
        symbol: Symbol,
        price: Price,
        match_number: MatchNumber,
    },

    /// 'Q': auction cross print; note the 64-bit share count.
    CrossTrade {
        stock_locate: StockLocate,
        timestamp: u64,
        shares: u64,
        symbol: Symbol,
        price: Price,
        match_number: MatchNumber,
    },

    /// 'B': voids a previously printed trade by match number.
    BrokenTrade {
        stock_locate: StockLocate,
        timestamp: u64,
        match_number: MatchNumber,
    },
}

impl ItchMessage {
    /// Parse one frame body (everything after the type code byte).
    ///
    /// Returns `Ok(None)` for type codes this pipeline does not recognize;
    /// the caller skips the frame. A body shorter than the type's layout
    /// is a `WireError`.
    pub fn parse(kind: u8, body: &[u8]) -> Result<Option<Self>, WireError> {
        let mut wire = Wire::new(body);
        let message = match kind {
            b'S' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let event_code = wire.read_u8()?;
                ItchMessage::SystemEvent {
                    stock_locate,
                    timestamp,
                    event_code,
                }
            }
            b'R' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let symbol = wire.read_symbol()?;
                wire.skip(20)?;
                ItchMessage::StockDirectory {
                    stock_locate,
                    timestamp,
                    symbol,
                }
            }
            b'A' | b'F' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let reference = OrderRef::new(wire.read_u64()?);
                let side = Side::from_indicator(wire.read_u8()?);
                let shares = wire.read_u32()?;
                let symbol = wire.read_symbol()?;
                let price = wire.read_price()?;
                if kind == b'A' {
                    ItchMessage::AddOrder {
                        stock_locate,
                        timestamp,
                        reference,
                        side,
                        shares,
                        symbol,
                        price,
                    }
                } else {
                    wire.skip(4)?; // attribution
                    ItchMessage::AddOrderMpid {
                        stock_locate,
                        timestamp,
                        reference,
                        side,
                        shares,
                        symbol,
                        price,
                    }
                }
            }
            b'E' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let reference = OrderRef::new(wire.read_u64()?);
                let executed_shares = wire.read_u32()?;
                let match_number = MatchNumber::new(wire.read_u64()?);
                ItchMessage::OrderExecuted {
                    stock_locate,
                    timestamp,
                    reference,
                    executed_shares,
                    match_number,
                }
            }
            b'C' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let reference = OrderRef::new(wire.read_u64()?);
                let executed_shares = wire.read_u32()?;
                let match_number = MatchNumber::new(wire.read_u64()?);
                let printable = wire.read_u8()? == b'Y';
                let execution_price = wire.read_price()?;
                ItchMessage::OrderExecutedWithPrice {
                    stock_locate,
                    timestamp,
                    reference,
                    executed_shares,
                    match_number,
                    printable,
                    execution_price,
                }
            }
            b'U' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let original = OrderRef::new(wire.read_u64()?);
                let replacement = OrderRef::new(wire.read_u64()?);
                let shares = wire.read_u32()?;
                let price = wire.read_price()?;
                ItchMessage::OrderReplace {
                    stock_locate,
                    timestamp,
                    original,
                    replacement,
                    shares,
                    price,
                }
            }
            b'P' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                wire.skip(9)?; // deprecated order reference and side
                let shares = wire.read_u32()?;
                let symbol = wire.read_symbol()?;
                let price = wire.read_price()?;
                let match_number = MatchNumber::new(wire.read_u64()?);
                ItchMessage::Trade {
                    stock_locate,
                    timestamp,
                    shares,
                    symbol,
                    price,
                    match_number,
                }
            }
            b'Q' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let shares = wire.read_u64()?;
                let symbol = wire.read_symbol()?;
                let price = wire.read_price()?;
                let match_number = MatchNumber::new(wire.read_u64()?);
                wire.skip(1)?; // cross type
                ItchMessage::CrossTrade {
                    stock_locate,
                    timestamp,
                    shares,
                    symbol,
                    price,
                    match_number,
                }
            }
            b'B' => {
                let stock_locate = StockLocate::new(wire.read_u16()?);
                wire.skip(2)?;
                let timestamp = wire.read_u48()?;
                let match_number = MatchNumber::new(wire.read_u64()?);
                ItchMessage::BrokenTrade {
                    stock_locate,
                    timestamp,
                    match_number,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(message))
    }

    /// Nanoseconds since midnight of the trading day.
    pub fn timestamp(&self) -> u64 {
        match *self {
            ItchMessage::SystemEvent { timestamp, .. }
            | ItchMessage::StockDirectory { timestamp, .. }
            | ItchMessage::AddOrder { timestamp, .. }
            | ItchMessage::AddOrderMpid { timestamp, .. }
            | ItchMessage::OrderExecuted { timestamp, .. }
            | ItchMessage::OrderExecutedWithPrice { timestamp, .. }
            | ItchMessage::OrderReplace { timestamp, .. }
            | ItchMessage::Trade { timestamp, .. }
            | ItchMessage::CrossTrade { timestamp, .. }
            | ItchMessage::BrokenTrade { timestamp, .. } => timestamp,
        }
    }

    /// Message type as a string label for logging.
    pub fn type_label(&self) -> &'static str {
        match self {
            ItchMessage::SystemEvent { .. } => "SystemEvent",
            ItchMessage::StockDirectory { .. } => "StockDirectory",
            ItchMessage::AddOrder { .. } => "AddOrder",
            ItchMessage::AddOrderMpid { .. } => "AddOrderMpid",
            ItchMessage::OrderExecuted { .. } => "OrderExecuted",
            ItchMessage::OrderExecutedWithPrice { .. } => "OrderExecutedWithPrice",
            ItchMessage::OrderReplace { .. } => "OrderReplace",
            ItchMessage::Trade { .. } => "Trade",
            ItchMessage::CrossTrade { .. } => "CrossTrade",
            ItchMessage::BrokenTrade { .. } => "BrokenTrade",
        }
    }
}
