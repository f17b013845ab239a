//! Feed aggregation state
//!
//! `VwapAggregator` is the serial choke point of the pipeline: only the
//! parser thread touches it, so there is no locking inside. It maintains
//! the locate ↔ symbol directory, the live order index, the match-number
//! trade ledger, and per-security running VWAP accumulators, and fires the
//! hourly report off message timestamps.
//!
//! Conditions that occur in real data (duplicate records, missing
//! references, directory conflicts) are reported as operation errors and
//! dropped by the caller; none of them aborts the session.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info};

use types::ids::{MatchNumber, OrderRef, StockLocate};
use types::numeric::{Price, PRICE_SCALE};
use types::order::Order;
use types::symbol::Symbol;
use types::trade::Trade;

use crate::report::{ReportRow, ReportWriter};

/// Nanoseconds per trading hour.
pub const NANOS_PER_HOUR: u64 = 3_600_000_000_000;

/// Hour of day (0..24) of a nanoseconds-since-midnight timestamp.
pub fn hour_of_day(timestamp: u64) -> u32 {
    ((timestamp / NANOS_PER_HOUR) % 24) as u32
}

/// Recoverable per-operation failures.
///
/// Each one means a single message's effect is dropped; the pipeline
/// continues with the next message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("order reference {0} already live")]
    DuplicateOrder(OrderRef),

    #[error("match number {0} already printed")]
    DuplicateTrade(MatchNumber),

    #[error("stock directory conflict for locate {0}")]
    DirectoryConflict(StockLocate),

    #[error("no live order for reference {0}")]
    MissingOrder(OrderRef),

    #[error("no printed trade for match number {0}")]
    MissingTrade(MatchNumber),
}

/// Running VWAP accumulators for one security.
///
/// Value is kept in integer ten-thousandths; `u64 shares × u32 price`
/// fits in 96 bits per trade, so a u128 session total cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityStats {
    traded_shares: u128,
    traded_value_e4: u128,
}

impl SecurityStats {
    fn record(&mut self, trade: &Trade) {
        self.traded_shares += u128::from(trade.shares);
        self.traded_value_e4 += trade.notional_e4();
    }

    // Only called for trades still in the ledger, whose contribution is
    // included by invariant, so the subtraction cannot underflow.
    fn reverse(&mut self, trade: &Trade) {
        self.traded_shares -= u128::from(trade.shares);
        self.traded_value_e4 -= trade.notional_e4();
    }

    /// Total shares printed and not broken.
    pub fn traded_shares(&self) -> u128 {
        self.traded_shares
    }

    /// Total traded value in ten-thousandths of a currency unit.
    pub fn traded_value_e4(&self) -> u128 {
        self.traded_value_e4
    }

    /// Volume-weighted average price at display precision (4 fractional
    /// digits, half-up). Zero when nothing has traded.
    pub fn vwap(&self) -> Decimal {
        if self.traded_shares == 0 {
            return Decimal::new(0, PRICE_SCALE);
        }
        let vwap_e4 = (self.traded_value_e4 + self.traded_shares / 2) / self.traded_shares;
        // A weighted mean of u32-ranged prices stays u32-ranged.
        Decimal::from_i128_with_scale(vwap_e4 as i128, PRICE_SCALE)
    }
}

/// Session-wide aggregation state and hourly report trigger.
pub struct VwapAggregator {
    locate_to_symbol: HashMap<StockLocate, Symbol>,
    symbol_to_locate: HashMap<Symbol, StockLocate>,
    stats: HashMap<StockLocate, SecurityStats>,
    orders: HashMap<OrderRef, Order>,
    trades: HashMap<MatchNumber, Trade>,

    latest_timestamp: u64,
    market_open: bool,
    reports: ReportWriter,

    trades_recorded: u64,
    trades_broken: u64,
    reports_written: u64,
}

impl VwapAggregator {
    pub fn new(reports: ReportWriter) -> Self {
        Self {
            locate_to_symbol: HashMap::new(),
            symbol_to_locate: HashMap::new(),
            stats: HashMap::new(),
            orders: HashMap::new(),
            trades: HashMap::new(),
            latest_timestamp: 0,
            market_open: false,
            reports,
            trades_recorded: 0,
            trades_broken: 0,
            reports_written: 0,
        }
    }

    /// Advance the session clock.
    ///
    /// If the market is open and `timestamp` lands in a later hour than the
    /// last message, the report for the new hour is written synchronously
    /// before the timestamp is stored, and therefore before the current
    /// message's own effect is applied.
    pub fn update_timestamp(&mut self, timestamp: u64) {
        let next_hour = hour_of_day(timestamp);
        if self.market_open && next_hour > hour_of_day(self.latest_timestamp) {
            self.emit_report(next_hour);
        }
        self.latest_timestamp = timestamp;
    }

    /// Apply a session event code: 'Q' opens the market, 'M' closes it and
    /// writes the final report. Every other code is ignored.
    pub fn on_system_event(&mut self, event_code: u8) {
        match event_code {
            b'Q' => {
                self.market_open = true;
                info!("market open");
            }
            b'M' => {
                self.market_open = false;
                let hour = hour_of_day(self.latest_timestamp);
                info!(hour, "market close");
                self.emit_report(hour);
            }
            _ => {}
        }
    }

    /// Record one stock directory entry, both directions at once.
    ///
    /// A repeated entry must agree with the existing mapping; on conflict
    /// nothing changes.
    pub fn add_stock_record(
        &mut self,
        locate: StockLocate,
        symbol: Symbol,
    ) -> Result<(), AggregateError> {
        if let Some(existing) = self.locate_to_symbol.get(&locate) {
            if *existing != symbol {
                return Err(AggregateError::DirectoryConflict(locate));
            }
        }
        if let Some(existing) = self.symbol_to_locate.get(&symbol) {
            if *existing != locate {
                return Err(AggregateError::DirectoryConflict(locate));
            }
        }
        self.locate_to_symbol.insert(locate, symbol);
        self.symbol_to_locate.insert(symbol, locate);
        Ok(())
    }

    pub fn get_symbol(&self, locate: StockLocate) -> Option<Symbol> {
        self.locate_to_symbol.get(&locate).copied()
    }

    pub fn get_locate(&self, symbol: Symbol) -> Option<StockLocate> {
        self.symbol_to_locate.get(&symbol).copied()
    }

    /// Index a new live order by its reference number.
    pub fn add_order(&mut self, order: Order) -> Result<(), AggregateError> {
        match self.orders.entry(order.reference) {
            Entry::Occupied(_) => Err(AggregateError::DuplicateOrder(order.reference)),
            Entry::Vacant(slot) => {
                slot.insert(order);
                Ok(())
            }
        }
    }

    pub fn get_order(&self, reference: OrderRef) -> Option<&Order> {
        self.orders.get(&reference)
    }

    /// Atomically retire `original` and index its successor under
    /// `replacement`, preserving security and side.
    ///
    /// A missing original or a collision on the new reference leaves the
    /// index untouched.
    pub fn replace_order(
        &mut self,
        original: OrderRef,
        replacement: OrderRef,
        shares: u32,
        price: Price,
    ) -> Result<(), AggregateError> {
        if self.orders.contains_key(&replacement) {
            return Err(AggregateError::DuplicateOrder(replacement));
        }
        let old = self
            .orders
            .remove(&original)
            .ok_or(AggregateError::MissingOrder(original))?;
        self.orders
            .insert(replacement, old.replaced(replacement, shares, price));
        Ok(())
    }

    /// Ledger a printed trade and fold it into its security's stats.
    ///
    /// A duplicate match number changes nothing; the print is never
    /// double-counted. The stats entry is created on first trade.
    pub fn add_trade(&mut self, trade: Trade) -> Result<(), AggregateError> {
        match self.trades.entry(trade.match_number) {
            Entry::Occupied(_) => Err(AggregateError::DuplicateTrade(trade.match_number)),
            Entry::Vacant(slot) => {
                slot.insert(trade);
                self.stats
                    .entry(trade.stock_locate)
                    .or_default()
                    .record(&trade);
                self.trades_recorded += 1;
                Ok(())
            }
        }
    }

    /// Reverse a printed trade: subtract its contribution from its
    /// security's stats and erase the ledger entry.
    pub fn cancel_trade(&mut self, match_number: MatchNumber) -> Result<(), AggregateError> {
        let trade = self
            .trades
            .remove(&match_number)
            .ok_or(AggregateError::MissingTrade(match_number))?;
        if let Some(stats) = self.stats.get_mut(&trade.stock_locate) {
            stats.reverse(&trade);
        }
        self.trades_broken += 1;
        Ok(())
    }

    pub fn stats(&self, locate: StockLocate) -> Option<&SecurityStats> {
        self.stats.get(&locate)
    }

    pub fn is_market_open(&self) -> bool {
        self.market_open
    }

    pub fn latest_timestamp(&self) -> u64 {
        self.latest_timestamp
    }

    pub fn trades_recorded(&self) -> u64 {
        self.trades_recorded
    }

    pub fn trades_broken(&self) -> u64 {
        self.trades_broken
    }

    pub fn reports_written(&self) -> u64 {
        self.reports_written
    }

    /// Write the cumulative session-to-date report for `hour`.
    ///
    /// Every security with a stats entry is included, whether or not it
    /// traded in the past hour. A locate without a directory entry is a
    /// feed error; its row is logged and skipped.
    fn emit_report(&mut self, hour: u32) {
        let mut rows = Vec::with_capacity(self.stats.len());
        for (locate, stats) in &self.stats {
            match self.locate_to_symbol.get(locate) {
                Some(symbol) => rows.push(ReportRow {
                    symbol: *symbol,
                    vwap: stats.vwap(),
                }),
                None => error!(
                    locate = locate.raw(),
                    "trade printed for undeclared locate; row skipped"
                ),
            }
        }

        match self.reports.write_hourly(hour, &rows) {
            Ok(path) => {
                self.reports_written += 1;
                info!(
                    hour,
                    path = %path.display(),
                    securities = rows.len(),
                    "hourly report written"
                );
            }
            Err(err) => {
                error!(hour, error = %err, "report emission failed; hour skipped");
            }
        }
    }
}
