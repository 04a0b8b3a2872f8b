use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use matchbook::accounts::InMemoryLedger;
use matchbook::book::Book;
use matchbook::matcher::attempt_fill;
use matchbook::orders::{Order, OrderKind, Side};
use std::time::SystemTime;

fn setup_book(depth: u64, orders_per_level: u64) -> Book {
    let mut book = Book::new();
    for price in 1..=depth {
        for i in 0..orders_per_level {
            book.insert(Order {
                id: price * 1_000 + i,
                account_id: "seller".into(),
                side: Side::Sell,
                kind: OrderKind::Limit,
                price,
                open: 1,
                filled: 0,
                history: Vec::new(),
                created_at: price * 1_000 + i,
                timestamp: SystemTime::now(),
            });
            book.insert(Order {
                id: (depth + price) * 1_000 + i,
                account_id: "buyer".into(),
                side: Side::Buy,
                kind: OrderKind::Limit,
                price,
                open: 1,
                filled: 0,
                history: Vec::new(),
                created_at: (depth + price) * 1_000 + i,
                timestamp: SystemTime::now(),
            });
        }
    }
    book
}

fn bench_attempt_fill(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;
    let ledger = InMemoryLedger::new();
    ledger.open_account("buyer", u64::MAX / 2);
    ledger.open_account("seller", u64::MAX / 2);
    let book = setup_book(depth, orders_per_level);

    c.bench_function("fill 1 market order across half the book", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| {
                let mut incoming = Order {
                    id: 0,
                    account_id: "buyer".into(),
                    side: Side::Buy,
                    kind: OrderKind::Market,
                    price: 0,
                    open: depth * orders_per_level / 2,
                    filled: 0,
                    history: Vec::new(),
                    created_at: 0,
                    timestamp: SystemTime::now(),
                };
                attempt_fill(&mut book, &ledger, &mut incoming)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("fill 1 limit crossing order", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| {
                let mut incoming = Order {
                    id: 1,
                    account_id: "seller".into(),
                    side: Side::Sell,
                    kind: OrderKind::Limit,
                    price: depth / 2,
                    open: depth * orders_per_level,
                    filled: 0,
                    history: Vec::new(),
                    created_at: 0,
                    timestamp: SystemTime::now(),
                };
                attempt_fill(&mut book, &ledger, &mut incoming)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_attempt_fill);
criterion_main!(benches);
