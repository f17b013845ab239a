//! VWAP Reporting Service
//!
//! Consumes a NASDAQ ITCH 5.0 binary feed and produces, once per trading
//! hour while the market is open, a per-security volume-weighted average
//! price report.
//!
//! # Architecture
//!
//! ```text
//! ITCH byte stream
//!        │
//!   ┌────▼─────┐
//!   │ Decoder  │  ← length-prefixed frames → typed messages (reader thread)
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐
//!   │  Queue   │  ← bounded FIFO, mutex + condvar handoff
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐
//!   │Aggregator│  ← directory, order index, trade ledger, VWAP stats
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐
//!   │ Reports  │  ← <hour>.csv / <hour>.log per hour crossed
//!   └──────────┘
//! ```

pub mod aggregator;
pub mod decoder;
pub mod messages;
pub mod pipeline;
pub mod report;
pub mod wire;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
