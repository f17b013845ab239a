//! Reader / parser pipeline
//!
//! Two OS threads share one bounded FIFO. The reader runs the frame
//! decoder and pushes typed messages; the parser pops them in feed order
//! and drives the aggregator. Backpressure is the queue bound: a full
//! queue blocks the reader until the parser catches up.
//!
//! The aggregator is touched only by the parser thread, so it carries no
//! locks of its own. On end of stream (or on a fatal decode error) the
//! reader closes the queue; the parser drains whatever was enqueued and
//! only then surfaces the reader's result.

use std::collections::VecDeque;
use std::io::Read;
use std::thread;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::{info, warn};

use types::ids::OrderRef;
use types::order::Order;
use types::trade::Trade;

use crate::aggregator::{AggregateError, VwapAggregator};
use crate::decoder::{DecodeError, FrameDecoder};
use crate::messages::ItchMessage;

/// Default bound on the in-flight message queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16_384;

/// Fatal pipeline failures; per-message aggregator errors are logged and
/// dropped instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("reader thread panicked")]
    ReaderPanicked,
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames consumed by the decoder, recognized or not.
    pub frames_decoded: u64,
    /// Frames skipped for an unrecognized type code.
    pub unknown_skipped: u64,
    /// Messages whose effect was applied (including deliberate no-ops).
    pub messages_applied: u64,
    /// Messages dropped on an aggregator error.
    pub messages_dropped: u64,
}

/// Bounded FIFO handoff between the reader and the parser.
///
/// One mutex, two condition variables, two predicates: "queue non-empty
/// or finished" gates the consumer, "queue below capacity" gates the
/// producer.
pub struct MessageQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

struct QueueState {
    buf: VecDeque<ItchMessage>,
    finished: bool,
}

impl MessageQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            state: Mutex::new(QueueState {
                buf: VecDeque::with_capacity(capacity),
                finished: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Enqueue a message, blocking while the queue is full.
    pub fn push(&self, message: ItchMessage) {
        let mut state = self.state.lock();
        while state.buf.len() >= self.capacity && !state.finished {
            self.not_full.wait(&mut state);
        }
        state.buf.push_back(message);
        drop(state);
        self.not_empty.notify_one();
    }

    /// Dequeue the next message, blocking while the queue is empty and the
    /// producer is still running. Returns `None` once the queue is drained
    /// and finished.
    pub fn pop(&self) -> Option<ItchMessage> {
        let mut state = self.state.lock();
        while state.buf.is_empty() && !state.finished {
            self.not_empty.wait(&mut state);
        }
        let message = state.buf.pop_front();
        drop(state);
        if message.is_some() {
            self.not_full.notify_one();
        }
        message
    }

    /// Mark the producer done and wake all waiters.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.finished = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buf.is_empty()
    }
}

/// Run the full pipeline over a byte source until end of stream.
///
/// Spawns the reader thread, parses on the calling thread, and joins on
/// all paths. A decode error surfaces only after the parser has drained
/// every message decoded before it.
pub fn run<R: Read + Send>(
    source: R,
    aggregator: &mut VwapAggregator,
    queue_capacity: usize,
) -> Result<PipelineStats, PipelineError> {
    let queue = MessageQueue::with_capacity(queue_capacity);
    let mut applied = 0u64;
    let mut dropped = 0u64;

    let reader_outcome = thread::scope(|scope| {
        let handle = scope.spawn(|| {
            let mut decoder = FrameDecoder::new(source);
            loop {
                match decoder.next_message() {
                    Ok(Some(message)) => queue.push(message),
                    Ok(None) => {
                        queue.close();
                        return Ok((decoder.frames_read(), decoder.unknown_skipped()));
                    }
                    Err(err) => {
                        queue.close();
                        return Err(err);
                    }
                }
            }
        });

        while let Some(message) = queue.pop() {
            let label = message.type_label();
            match dispatch(aggregator, message) {
                Ok(()) => applied += 1,
                Err(err) => {
                    dropped += 1;
                    warn!(kind = label, error = %err, "message dropped");
                }
            }
        }

        handle.join()
    });

    let (frames_decoded, unknown_skipped) = reader_outcome
        .map_err(|_| PipelineError::ReaderPanicked)?
        .map_err(PipelineError::Decode)?;

    let stats = PipelineStats {
        frames_decoded,
        unknown_skipped,
        messages_applied: applied,
        messages_dropped: dropped,
    };
    info!(
        frames = stats.frames_decoded,
        applied = stats.messages_applied,
        dropped = stats.messages_dropped,
        "pipeline complete"
    );
    Ok(stats)
}

/// Apply one message to the aggregator.
///
/// The clock always advances first, so an hour boundary fires its report
/// before the message's own effect lands.
fn dispatch(aggregator: &mut VwapAggregator, message: ItchMessage) -> Result<(), AggregateError> {
    aggregator.update_timestamp(message.timestamp());

    match message {
        ItchMessage::SystemEvent { event_code, .. } => {
            aggregator.on_system_event(event_code);
            Ok(())
        }
        ItchMessage::StockDirectory {
            stock_locate,
            symbol,
            ..
        } => aggregator.add_stock_record(stock_locate, symbol),
        ItchMessage::AddOrder {
            stock_locate,
            reference,
            side,
            shares,
            price,
            ..
        }
        | ItchMessage::AddOrderMpid {
            stock_locate,
            reference,
            side,
            shares,
            price,
            ..
        } => aggregator.add_order(Order {
            stock_locate,
            side,
            shares,
            price,
            reference,
        }),
        ItchMessage::OrderExecuted {
            stock_locate,
            reference,
            executed_shares,
            match_number,
            ..
        } => {
            // The price is not on the wire; it is the referenced order's
            // price at execution time.
            let price = resolve_order_price(aggregator, reference)?;
            aggregator.add_trade(Trade {
                stock_locate,
                shares: u64::from(executed_shares),
                price,
                match_number,
            })
        }
        ItchMessage::OrderExecutedWithPrice {
            stock_locate,
            executed_shares,
            match_number,
            printable,
            execution_price,
            ..
        } => {
            if !printable {
                return Ok(());
            }
            aggregator.add_trade(Trade {
                stock_locate,
                shares: u64::from(executed_shares),
                price: execution_price,
                match_number,
            })
        }
        ItchMessage::OrderReplace {
            original,
            replacement,
            shares,
            price,
            ..
        } => aggregator.replace_order(original, replacement, shares, price),
        ItchMessage::Trade {
            stock_locate,
            shares,
            price,
            match_number,
            ..
        } => aggregator.add_trade(Trade {
            stock_locate,
            shares: u64::from(shares),
            price,
            match_number,
        }),
        ItchMessage::CrossTrade {
            stock_locate,
            shares,
            price,
            match_number,
            ..
        } => aggregator.add_trade(Trade {
            stock_locate,
            shares,
            price,
            match_number,
        }),
        ItchMessage::BrokenTrade { match_number, .. } => aggregator.cancel_trade(match_number),
    }
}

fn resolve_order_price(
    aggregator: &VwapAggregator,
    reference: OrderRef,
) -> Result<types::numeric::Price, AggregateError> {
    aggregator
        .get_order(reference)
        .map(|order| order.price)
        .ok_or(AggregateError::MissingOrder(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::ids::{MatchNumber, StockLocate};

    fn sample_message(timestamp: u64) -> ItchMessage {
        ItchMessage::BrokenTrade {
            stock_locate: StockLocate::new(1),
            timestamp,
            match_number: MatchNumber::new(timestamp),
        }
    }

    #[test]
    fn test_queue_fifo_order() {
        let queue = MessageQueue::with_capacity(8);
        queue.push(sample_message(1));
        queue.push(sample_message(2));
        queue.push(sample_message(3));
        queue.close();

        assert_eq!(queue.pop().unwrap().timestamp(), 1);
        assert_eq!(queue.pop().unwrap().timestamp(), 2);
        assert_eq!(queue.pop().unwrap().timestamp(), 3);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_pop_drains_after_close() {
        let queue = MessageQueue::with_capacity(8);
        queue.push(sample_message(1));
        queue.close();

        // Close does not discard the backlog.
        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_blocks_at_capacity() {
        let queue = MessageQueue::with_capacity(2);
        let pushed = AtomicUsize::new(0);

        thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..4 {
                    queue.push(sample_message(i));
                    pushed.fetch_add(1, Ordering::SeqCst);
                }
            });

            // Give the producer time to hit the bound.
            while pushed.load(Ordering::SeqCst) < 2 {
                thread::yield_now();
            }
            thread::sleep(std::time::Duration::from_millis(20));
            assert_eq!(pushed.load(Ordering::SeqCst), 2);

            // Draining unblocks it.
            for expected in 0..4 {
                let message = queue.pop().unwrap();
                assert_eq!(message.timestamp(), expected);
            }
        });

        assert_eq!(pushed.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_pop_wakes_on_close() {
        let queue = MessageQueue::with_capacity(2);
        thread::scope(|scope| {
            let waiter = scope.spawn(|| queue.pop());
            thread::sleep(std::time::Duration::from_millis(10));
            queue.close();
            assert!(waiter.join().unwrap().is_none());
        });
    }
}
