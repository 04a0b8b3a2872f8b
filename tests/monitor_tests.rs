use std::sync::Arc;
use std::time::Duration;

use matchbook::accounts::InMemoryLedger;
use matchbook::engine::{Engine, EngineConfig};
use matchbook::events::OrderStatus;
use matchbook::monitor::StateMonitor;
use matchbook::orders::{OrderKind, OrderRequest, Side};
use tokio_util::sync::CancellationToken;

fn limit(id: u64, account: &str, side: Side, price: u64, quantity: u64) -> OrderRequest {
    OrderRequest {
        id,
        account_id: account.into(),
        side,
        kind: OrderKind::Limit,
        price: Some(price),
        quantity,
    }
}

#[tokio::test]
async fn monitor_follows_order_lifecycles_end_to_end() {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.open_account("seller", 0);
    ledger.open_account("buyer", 1000);
    let (engine, status_rx) = Engine::new(ledger, EngineConfig::default());

    let monitor = StateMonitor::new(status_rx, Duration::from_secs(60));
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(monitor.run(shutdown.clone()));

    // one order fills, one rests and is canceled, one stays resting
    engine
        .submit(limit(1, "seller", Side::Sell, 50, 1))
        .unwrap();
    engine.submit(limit(2, "buyer", Side::Buy, 50, 1)).unwrap();
    engine.submit(limit(3, "buyer", Side::Buy, 40, 1)).unwrap();
    engine.cancel(3);
    engine.submit(limit(4, "buyer", Side::Buy, 30, 1)).unwrap();

    shutdown.cancel();
    let monitor = handle.await.unwrap();

    assert_eq!(monitor.status(1), Some(OrderStatus::Filled));
    assert_eq!(monitor.status(2), Some(OrderStatus::Filled));
    assert_eq!(monitor.status(3), Some(OrderStatus::Canceled));
    assert_eq!(monitor.status(4), Some(OrderStatus::Resting));

    let counts = monitor.counts();
    assert_eq!(counts.get(&OrderStatus::Filled), Some(&2));
    assert_eq!(counts.get(&OrderStatus::Canceled), Some(&1));
    assert_eq!(counts.get(&OrderStatus::Resting), Some(&1));
}
