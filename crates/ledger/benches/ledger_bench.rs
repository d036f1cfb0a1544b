//! Benchmarks for the ledger commit path.

use common::{Money, OperationToken, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use ledger::{InMemoryLedgerStore, Ledger};

fn bench_reserve_and_apply(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("reserve_and_apply", |b| {
        let ledger = Ledger::new(InMemoryLedgerStore::new());
        let user = UserId::new();
        b.to_async(&runtime).iter(|| {
            let ledger = &ledger;
            async move {
                let token = OperationToken::new();
                ledger.reserve_token(user, token).await.unwrap();
                ledger
                    .apply(user, token, Money::from_cents(50))
                    .await
                    .unwrap();
            }
        });
    });
}

fn bench_balance(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let ledger = Ledger::new(InMemoryLedgerStore::new());
    let user = UserId::new();
    runtime.block_on(async {
        for _ in 0..1000 {
            let token = OperationToken::new();
            ledger.reserve_token(user, token).await.unwrap();
            ledger
                .apply(user, token, Money::from_cents(1))
                .await
                .unwrap();
        }
    });

    c.bench_function("balance_1000_entries", |b| {
        let ledger = &ledger;
        b.to_async(&runtime)
            .iter(|| async move { ledger.balance(user).await.unwrap() });
    });
}

criterion_group!(benches, bench_reserve_and_apply, bench_balance);
criterion_main!(benches);
