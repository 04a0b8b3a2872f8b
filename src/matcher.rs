use std::cmp::Ordering;
use std::time::SystemTime;

use tracing::{info, warn};

use crate::accounts::{Ledger, LedgerError};
use crate::book::Book;
use crate::events::{Fill, FillReason, Match};
use crate::orders::{Order, Side};

/// How an incoming order's fill loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The incoming order is fully matched.
    Filled,
    /// No crossable opposite remains; a limit order rests, a market order is
    /// canceled by the dispatcher.
    Blocked,
    /// A ledger transfer failed; the incoming order is canceled. Matches that
    /// already committed stand.
    TransferFailed(LedgerError),
}

/// Everything one call to [`attempt_fill`] produced: the match records in the
/// order the fill steps were taken, terminal fills for resting orders the
/// loop exhausted, and the reason the loop stopped.
#[derive(Debug)]
pub struct FillReport {
    pub matches: Vec<Match>,
    pub maker_fills: Vec<Fill>,
    pub outcome: FillOutcome,
}

/// Drives `incoming` against the opposite side of the book until it is filled
/// or blocked.
///
/// The caller holds the book lock for the whole call; the only blocking
/// operation inside the loop is the ledger transfer, which must be fast and
/// must not re-enter the book.
///
/// Each iteration selects the FIFO head of the best opposing price level and
/// applies exactly one of three cases against it:
/// - **exact**: `wanted == available`, both orders fill and leave the book
/// - **humble**: `wanted < available`, incoming fills, the resting order
///   keeps its remainder
/// - **greedy**: `wanted > available`, the resting order is consumed and the
///   loop continues against the next best
///
/// The execution price is always the resting order's price, and funds move
/// buyer to seller before either order's `filled` is touched, so a failed
/// transfer leaves both orders exactly as they were.
pub fn attempt_fill(book: &mut Book, ledger: &dyn Ledger, incoming: &mut Order) -> FillReport {
    info!("matching incoming order: {:?}", incoming.id);
    let mut matches = Vec::new();
    let mut maker_fills = Vec::new();

    let outcome = loop {
        let wanted = incoming.remaining();
        if wanted == 0 {
            break FillOutcome::Filled;
        }

        let Some(best) = book.best_opposite(incoming.side) else {
            break FillOutcome::Blocked;
        };
        if !incoming.crosses(best) {
            break FillOutcome::Blocked;
        }

        let opposite = book.opposite_mut(incoming.side);
        let resting = opposite
            .front_mut(best)
            .expect("level reported as best holds no orders: book invariant broken");

        if resting.id == incoming.id {
            warn!("order {} would match itself, leaving it unmatched", incoming.id);
            break FillOutcome::Blocked;
        }

        let available = resting.remaining();
        let price = resting.price;

        // The three supply/demand cases: greedy wants more than the resting
        // order has, humble wants less, exact drains both at once.
        let (quantity, takes_all, terminal) = match wanted.cmp(&available) {
            Ordering::Greater => (available, true, false), // greedy
            Ordering::Less => (wanted, false, true),       // humble
            Ordering::Equal => (wanted, true, true),       // exact
        };

        let total = price
            .checked_mul(quantity)
            .expect("fill notional exceeds u64: submission bound not enforced");

        let record = match incoming.side {
            Side::Buy => Match {
                buy_id: incoming.id,
                sell_id: resting.id,
                buy_account: incoming.account_id.clone(),
                sell_account: resting.account_id.clone(),
                price,
                quantity,
                total,
                timestamp: SystemTime::now(),
            },
            Side::Sell => Match {
                buy_id: resting.id,
                sell_id: incoming.id,
                buy_account: resting.account_id.clone(),
                sell_account: incoming.account_id.clone(),
                price,
                quantity,
                total,
                timestamp: SystemTime::now(),
            },
        };

        if let Err(err) = ledger.transfer(&record.buy_account, &record.sell_account, total) {
            warn!("transfer for order {} failed: {}", incoming.id, err);
            break FillOutcome::TransferFailed(err);
        }

        resting.filled += quantity;
        resting.history.push(record.clone());
        incoming.filled += quantity;
        incoming.history.push(record.clone());
        info!(
            "match: buy {} / sell {} for {} @ {}",
            record.buy_id, record.sell_id, quantity, price
        );

        if takes_all {
            let maker = opposite
                .pop_front(best)
                .expect("exhausted resting order vanished from its level");
            maker_fills.push(Fill {
                order: maker,
                reason: FillReason::Filled,
            });
        }
        matches.push(record);

        if terminal {
            break FillOutcome::Filled;
        }
    };

    FillReport {
        matches,
        maker_fills,
        outcome,
    }
}
