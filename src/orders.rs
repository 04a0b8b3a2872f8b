use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::events::Match;

/// Which side of the market the order is on.
///
/// The matching engine always takes the **best price first**: an incoming
/// buy matches the **lowest ask**, an incoming sell matches the
/// **highest bid**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,  // Bid
    Sell, // Ask
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Specifies whether an order is a Limit or Market order.
///
/// - `Limit`: Executes at a specific price or better
/// - `Market`: Executes immediately at the best available price; never rests in the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
    Market,
}

/// An order submitted by a trader, as it lives inside the engine.
///
/// - `price` is in integer minor units (e.g. cents); market orders carry 0 and
///   are priced by whatever they cross
/// - `open` is immutable after creation; `filled` only grows and never exceeds it
/// - `created_at` is a monotonic sequence assigned at submission and ties
///   time priority within a price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub account_id: String,
    pub side: Side,
    pub kind: OrderKind,
    pub price: u64,
    pub open: u64,
    pub filled: u64,
    pub history: Vec<Match>,
    pub created_at: u64,
    pub timestamp: SystemTime,
}

impl Order {
    /// Quantity still waiting to be matched.
    pub fn remaining(&self) -> u64 {
        self.open - self.filled
    }

    /// An exhausted order is fully matched and must not appear in any book.
    pub fn is_exhausted(&self) -> bool {
        self.filled == self.open
    }

    /// Whether this order is willing to trade at `resting_price`.
    ///
    /// A buy crosses any ask at or below its limit, a sell crosses any bid at
    /// or above it. Market orders cross everything.
    pub fn crosses(&self, resting_price: u64) -> bool {
        match self.kind {
            OrderKind::Market => true,
            OrderKind::Limit => match self.side {
                Side::Buy => self.price >= resting_price,
                Side::Sell => self.price <= resting_price,
            },
        }
    }
}

/// A submission as it arrives from the outside world.
///
/// - `id` is assigned by the submitter and opaque to the engine
/// - `price` is required for limit orders and ignored for market orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub id: u64,
    pub account_id: String,
    pub side: Side,
    pub kind: OrderKind,
    pub price: Option<u64>,
    pub quantity: u64,
}
