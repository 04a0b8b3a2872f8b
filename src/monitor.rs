use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::events::{OrderStatus, StatusUpdate};

/// Aggregates order state transitions from the engine's status stream into
/// an id → latest-status index, and periodically logs a snapshot for
/// operators.
///
/// Purely observational: nothing here feeds back into matching.
pub struct StateMonitor {
    statuses: HashMap<u64, OrderStatus>,
    status_rx: mpsc::Receiver<StatusUpdate>,
    snapshot_interval: Duration,
}

impl StateMonitor {
    pub fn new(status_rx: mpsc::Receiver<StatusUpdate>, snapshot_interval: Duration) -> Self {
        Self {
            statuses: HashMap::new(),
            status_rx,
            snapshot_interval,
        }
    }

    /// Latest status seen for an order, if any.
    pub fn status(&self, order_id: u64) -> Option<OrderStatus> {
        self.statuses.get(&order_id).copied()
    }

    /// Number of orders currently in each state.
    pub fn counts(&self) -> HashMap<OrderStatus, usize> {
        let mut counts = HashMap::new();
        for status in self.statuses.values() {
            *counts.entry(*status).or_insert(0) += 1;
        }
        counts
    }

    /// Consumes the status stream until cancellation or until every sender is
    /// gone, logging a snapshot every interval. Returns itself so callers can
    /// inspect the final index.
    pub async fn run(mut self, shutdown: CancellationToken) -> Self {
        let mut ticker = tokio::time::interval(self.snapshot_interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                update = self.status_rx.recv() => match update {
                    Some(update) => self.apply(update),
                    None => break,
                },
                _ = ticker.tick() => self.log_snapshot(),
            }
        }
        // pick up whatever was still queued when we were told to stop
        while let Ok(update) = self.status_rx.try_recv() {
            self.apply(update);
        }
        self.log_snapshot();
        self
    }

    fn apply(&mut self, update: StatusUpdate) {
        self.statuses.insert(update.order_id, update.status);
    }

    fn log_snapshot(&self) {
        info!("order state snapshot: {:?}", self.counts());
    }
}
