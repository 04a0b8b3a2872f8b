use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::orders::Order;

/// A match represents one fill step between a buy and a sell order.
///
/// - The price comes from the resting order (price-time priority: the resting
///   order earned its price)
/// - `total` is `price * quantity` in integer minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub buy_id: u64,
    pub sell_id: u64,
    pub buy_account: String,
    pub sell_account: String,
    pub price: u64,
    pub quantity: u64,
    pub total: u64,
    pub timestamp: SystemTime,
}

/// Why an order reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillReason {
    /// Fully matched.
    Filled,
    /// Removed by an explicit cancel, or a market order that found no liquidity.
    Canceled,
    /// The buyer could not cover a fill step; the order was canceled.
    InsufficientFunds,
    /// The ledger failed for a reason other than funds; the order was canceled.
    LedgerError,
}

/// Terminal record for a single order: a snapshot of the order at the moment
/// it left the engine, plus the reason it did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub order: Order,
    pub reason: FillReason,
}

/// Latest known state of an order, as tracked by the state monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Resting,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
}

/// One state transition on the status stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub order_id: u64,
    pub status: OrderStatus,
    pub timestamp: SystemTime,
}
