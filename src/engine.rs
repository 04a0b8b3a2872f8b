use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::accounts::{Ledger, LedgerError};
use crate::book::{Book, BookSnapshot};
use crate::errors::{EngineError, SubmitError};
use crate::events::{Fill, FillReason, Match, OrderStatus, StatusUpdate};
use crate::matcher::{self, FillOutcome};
use crate::orders::{Order, OrderKind, OrderRequest};

/// Buffer sizes for the engine's event channels.
///
/// The broadcast channels are bounded; a consumer that falls more than a
/// buffer behind observes `RecvError::Lagged` rather than stalling the
/// matcher.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub match_buffer: usize,
    pub fill_buffer: usize,
    pub error_buffer: usize,
    pub status_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_buffer: 1024,
            fill_buffer: 1024,
            error_buffer: 256,
            status_buffer: 1024,
        }
    }
}

/// Returned from [`Engine::submit`] once the submitted order reached its
/// terminal state (or came to rest).
///
/// - `created_at`: the monotonic sequence number that ties time priority
/// - `matches`: the match records this submission produced, in fill order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub order_id: u64,
    pub created_at: u64,
    pub status: OrderStatus,
    pub matches: Vec<Match>,
}

/// The dispatcher: owns the book, admits submissions, runs each order
/// through the matcher, and fans out match, fill, and error events.
///
/// All book mutation is serialized behind one mutex, held from insertion
/// through the last fill step of a submission. Event delivery happens after
/// the lock is released.
#[derive(Clone)]
pub struct Engine {
    book: Arc<Mutex<Book>>,
    ledger: Arc<dyn Ledger>,
    match_tx: broadcast::Sender<Match>,
    fill_tx: broadcast::Sender<Fill>,
    error_tx: broadcast::Sender<EngineError>,
    status_tx: mpsc::Sender<StatusUpdate>,
    sequence: Arc<AtomicU64>,
}

impl Engine {
    /// Builds an engine around a ledger. The returned receiver is the status
    /// stream, intended for a [`StateMonitor`](crate::monitor::StateMonitor).
    pub fn new(
        ledger: Arc<dyn Ledger>,
        config: EngineConfig,
    ) -> (Self, mpsc::Receiver<StatusUpdate>) {
        let (match_tx, _) = broadcast::channel(config.match_buffer);
        let (fill_tx, _) = broadcast::channel(config.fill_buffer);
        let (error_tx, _) = broadcast::channel(config.error_buffer);
        let (status_tx, status_rx) = mpsc::channel(config.status_buffer);
        let engine = Self {
            book: Arc::new(Mutex::new(Book::new())),
            ledger,
            match_tx,
            fill_tx,
            error_tx,
            status_tx,
            sequence: Arc::new(AtomicU64::new(1)),
        };
        (engine, status_rx)
    }

    /// Admits a submission, drives it to its terminal state, and reports what
    /// happened.
    ///
    /// A blocked limit order comes to rest in the book; a blocked market
    /// order is canceled, since market orders never rest. A failed ledger
    /// transfer cancels the order with the matching fill reason.
    pub fn submit(&self, request: OrderRequest) -> Result<Receipt, SubmitError> {
        let mut order = self.admit(request)?;

        let report = {
            let mut book = self.book.lock().unwrap();
            // assigned under the book lock: sequence order is insertion order,
            // even with concurrent submitters
            order.created_at = self.sequence.fetch_add(1, Ordering::SeqCst);
            let report = matcher::attempt_fill(&mut book, self.ledger.as_ref(), &mut order);
            if report.outcome == FillOutcome::Blocked && order.kind == OrderKind::Limit {
                book.insert(order.clone());
            }
            report
        };

        for record in &report.matches {
            let _ = self.match_tx.send(record.clone());
        }
        for fill in report.maker_fills {
            self.publish_status(fill.order.id, OrderStatus::Filled);
            let _ = self.fill_tx.send(fill);
        }

        let status = match report.outcome {
            FillOutcome::Filled => {
                self.publish_fill(order.clone(), FillReason::Filled);
                OrderStatus::Filled
            }
            FillOutcome::Blocked => match order.kind {
                OrderKind::Limit => {
                    if order.filled > 0 {
                        OrderStatus::PartiallyFilled
                    } else {
                        OrderStatus::Resting
                    }
                }
                OrderKind::Market => {
                    info!("market order {} found no liquidity, canceling", order.id);
                    self.publish_fill(order.clone(), FillReason::Canceled);
                    OrderStatus::Canceled
                }
            },
            FillOutcome::TransferFailed(err) => {
                let reason = match err {
                    LedgerError::InsufficientFunds(_) => FillReason::InsufficientFunds,
                    LedgerError::UnknownAccount(_) => FillReason::LedgerError,
                };
                let _ = self.error_tx.send(EngineError::TransferFailed {
                    order_id: order.id,
                    source: err,
                });
                self.publish_fill(order.clone(), reason);
                OrderStatus::Rejected
            }
        };
        self.publish_status(order.id, status);

        Ok(Receipt {
            order_id: order.id,
            created_at: order.created_at,
            status,
            matches: report.matches,
        })
    }

    /// Cancels a resting order. A no-op returning `false` when the id is
    /// unknown or the order already left the book.
    pub fn cancel(&self, order_id: u64) -> bool {
        let removed = self.book.lock().unwrap().remove(order_id);
        match removed {
            Some(order) => {
                info!("order {} canceled", order_id);
                self.publish_status(order.id, OrderStatus::Canceled);
                let _ = self.fill_tx.send(Fill {
                    order,
                    reason: FillReason::Canceled,
                });
                true
            }
            None => {
                info!("cancel ignored for unknown or exhausted order {}", order_id);
                false
            }
        }
    }

    pub fn subscribe_matches(&self) -> broadcast::Receiver<Match> {
        self.match_tx.subscribe()
    }

    pub fn subscribe_fills(&self) -> broadcast::Receiver<Fill> {
        self.fill_tx.subscribe()
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<EngineError> {
        self.error_tx.subscribe()
    }

    /// Aggregated depth of the current book.
    pub fn book_snapshot(&self) -> BookSnapshot {
        self.book.lock().unwrap().snapshot()
    }

    /// Validation at the door: no state changes on rejection.
    fn admit(&self, request: OrderRequest) -> Result<Order, SubmitError> {
        if request.quantity == 0 {
            return Err(SubmitError::ZeroQuantity);
        }
        let price = match request.kind {
            OrderKind::Limit => {
                let price = request.price.ok_or(SubmitError::MissingPrice)?;
                if price == 0 {
                    return Err(SubmitError::ZeroPrice);
                }
                // bounds every later fill step: quantities only shrink
                if price.checked_mul(request.quantity).is_none() {
                    return Err(SubmitError::NotionalOverflow);
                }
                price
            }
            OrderKind::Market => 0,
        };
        Ok(Order {
            id: request.id,
            account_id: request.account_id,
            side: request.side,
            kind: request.kind,
            price,
            open: request.quantity,
            filled: 0,
            history: Vec::new(),
            // placeholder until the book lock is held in `submit`
            created_at: 0,
            timestamp: SystemTime::now(),
        })
    }

    fn publish_fill(&self, order: Order, reason: FillReason) {
        let _ = self.fill_tx.send(Fill { order, reason });
    }

    fn publish_status(&self, order_id: u64, status: OrderStatus) {
        let update = StatusUpdate {
            order_id,
            status,
            timestamp: SystemTime::now(),
        };
        match self.status_tx.try_send(update) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("status queue full, dropping update for order {}", order_id);
            }
            // nobody is monitoring; that's fine
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
