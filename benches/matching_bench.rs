use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use spot_venue::{MatchingEngine, PlatformConfig, SymbolConfig, Venue};
use spot_venue::order::{Order, OrderType, Side};
use spot_venue::venue::NewOrder;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;
use uuid::Uuid;

fn symbol_config() -> SymbolConfig {
    SymbolConfig::new("FOOBAR", dec!(0.01), "FOO", "BAR")
}

fn resting_order(side: Side, price: Decimal, seq: u64) -> Order {
    Order {
        order_id: Uuid::new_v4(),
        user_id: None,
        symbol: "FOOBAR".into(),
        side,
        order_type: OrderType::LimitOrder,
        size: dec!(10),
        price,
        create_time: SystemTime::UNIX_EPOCH + std::time::Duration::from_nanos(seq),
        sequence: seq,
        order_tag: None,
        trades: Vec::new(),
        canceled_at: None,
    }
}

fn bench_resting_book_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_limit_order, resting");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("insert 10k non-crossing bids", |b| {
        b.iter(|| {
            let engine = MatchingEngine::new(symbol_config());
            for i in 0..10_000u64 {
                let price = dec!(100) - Decimal::from(i % 500) * dec!(0.01);
                engine
                    .add_limit_order(resting_order(Side::Buy, price, i))
                    .unwrap();
            }
        });
    });
    group.finish();
}

fn bench_crossing_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_limit_order, crossing");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("match against 10k resting asks", |b| {
        b.iter(|| {
            let engine = MatchingEngine::new(symbol_config());
            for i in 0..10_000u64 {
                let price = dec!(100) + Decimal::from(i % 500) * dec!(0.01);
                engine
                    .add_limit_order(resting_order(Side::Sell, price, i))
                    .unwrap();
            }
            for i in 0..10_000u64 {
                engine
                    .add_limit_order(resting_order(Side::Buy, dec!(105), 10_000 + i))
                    .unwrap();
            }
        });
    });
    group.finish();
}

fn bench_venue_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("venue admission with settlement");
    group.throughput(Throughput::Elements(1));
    group.bench_function("add_order through coordinator", |b| {
        let venue = Venue::new(PlatformConfig::default());
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
            let price = dec!(100) + Decimal::from(i % 10) * dec!(0.01);
            venue
                .add_order(
                    NewOrder::limit("FOOBAR", side, dec!(1), price).for_user("bench-user"),
                )
                .unwrap();
        });
    });
    group.finish();
}

fn bench_concurrent_submit_and_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress matching");
    group.throughput(Throughput::Elements(1));
    group.bench_function("multi-thread submit/cancel TPS", |b| {
        let venue = Arc::new(Venue::new(PlatformConfig::default()));
        let submitted = Arc::new(AtomicU64::new(0));
        let running = Arc::new(AtomicBool::new(true));

        let submit_venue = Arc::clone(&venue);
        let submit_counter = Arc::clone(&submitted);
        let submit_running = Arc::clone(&running);
        let submit_thread = thread::spawn(move || {
            let mut rng = rand::rng();
            let mut i = 0u64;
            while submit_running.load(Ordering::Relaxed) {
                i += 1;
                let side = if rng.random_bool(0.5) {
                    Side::Buy
                } else {
                    Side::Sell
                };
                let price = dec!(100) + Decimal::from(i % 200) * dec!(0.01);
                let _ = submit_venue.add_order(
                    NewOrder::limit("FOOBAR", side, dec!(1), price).for_user("stress-user"),
                );
                submit_counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        let cancel_venue = Arc::clone(&venue);
        let cancel_running = Arc::clone(&running);
        let cancel_thread = thread::spawn(move || {
            let mut rng = rand::rng();
            while cancel_running.load(Ordering::Relaxed) {
                let bogus = uuid::Uuid::from_u128(rng.random::<u128>());
                let _ = cancel_venue.cancel_order(bogus, Some("FOOBAR"));
            }
        });

        b.iter(|| {
            venue.order_book("FOOBAR").unwrap();
        });

        running.store(false, Ordering::Relaxed);
        submit_thread.join().unwrap();
        cancel_thread.join().unwrap();
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_resting_book_build,
    bench_crossing_matches,
    bench_venue_admission,
    bench_concurrent_submit_and_cancel
);
criterion_main!(benches);
