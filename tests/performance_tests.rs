use rust_decimal::Decimal;
use std::time::Instant;
use uuid::Uuid;

use wallet_engine::cache::CacheStats;
use wallet_engine::models::{Account, AccountType, LedgerEntry, Transaction, TransactionType};
use wallet_engine::observability::LatencyTimer;

#[test]
fn test_cache_stats_concurrent_access() {
    use std::sync::Arc;
    use std::thread;

    let stats = Arc::new(CacheStats::new());
    let mut handles = vec![];

    for _ in 0..10 {
        let stats_clone = stats.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                stats_clone.record_hit();
                stats_clone.record_miss();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stats.get_hits(), 10000);
    assert_eq!(stats.get_misses(), 10000);
    assert!((stats.hit_rate() - 0.5).abs() < 0.01);
}

#[test]
fn test_cache_stats_hit_rate_edge_cases() {
    let stats = CacheStats::new();

    assert_eq!(stats.hit_rate(), 0.0);

    stats.record_hit();
    assert_eq!(stats.hit_rate(), 1.0);

    stats.record_miss();
    assert_eq!(stats.hit_rate(), 0.5);

    for _ in 0..98 {
        stats.record_hit();
    }
    assert!((stats.hit_rate() - 0.99).abs() < 0.01);
}

#[test]
fn test_account_creation_performance() {
    let start = Instant::now();
    let iterations = 10000;

    for _ in 0..iterations {
        let _account = Account::new("USD", AccountType::Main);
    }

    let elapsed = start.elapsed();
    let per_op = elapsed.as_nanos() / iterations as u128;

    println!("Account creation: {} ns/op", per_op);
    assert!(per_op < 10_000, "Account creation too slow: {} ns/op", per_op);
}

#[test]
fn test_transaction_creation_performance() {
    let source = Uuid::new_v4();
    let dest = Uuid::new_v4();
    let start = Instant::now();
    let iterations = 10000;

    for i in 0..iterations {
        let _tx = Transaction::new_pending(
            source,
            dest,
            Decimal::from(100 + i % 500),
            "USD",
            TransactionType::Transfer,
            None,
            None,
        );
    }

    let elapsed = start.elapsed();
    let per_op = elapsed.as_nanos() / iterations as u128;

    println!("Transaction creation: {} ns/op", per_op);
    assert!(per_op < 10_000, "Transaction creation too slow: {} ns/op", per_op);
}

#[test]
fn test_ledger_entry_signed_amount_performance() {
    let account = Uuid::new_v4();
    let tx_id = Uuid::new_v4();
    let debit = LedgerEntry::debit(tx_id, account, Decimal::from(1000), "USD", None);

    let start = Instant::now();
    let iterations = 100_000;
    for _ in 0..iterations {
        let _signed = debit.signed_amount();
    }
    let elapsed = start.elapsed();
    let per_op = elapsed.as_nanos() / iterations as u128;

    println!("signed_amount: {} ns/op", per_op);
    assert!(per_op < 1_000, "signed_amount too slow: {} ns/op", per_op);
}

#[test]
fn test_withdrawal_limit_calculation_performance() {
    let start = Instant::now();
    let iterations = 100_000;

    for i in 0..iterations {
        let balance = Decimal::from(i % 10_000);
        let _ = AccountType::Main.max_withdrawal(balance);
        let _ = AccountType::Pending.max_withdrawal(balance);
        let _ = AccountType::System.max_withdrawal(balance);
    }

    let elapsed = start.elapsed();
    let per_op = elapsed.as_nanos() / iterations as u128;

    println!("max_withdrawal: {} ns/op", per_op);
    assert!(per_op < 1_000, "max_withdrawal too slow: {} ns/op", per_op);
}

#[test]
fn test_latency_timer_accuracy() {
    let timer = LatencyTimer::new();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let elapsed = timer.elapsed_ms();
    assert!(elapsed >= 10.0);
    assert!(elapsed < 200.0);
}

#[test]
fn test_decimal_aggregation_performance() {
    let start = Instant::now();
    let iterations = 10_000;

    let mut total = Decimal::ZERO;
    for i in 0..iterations {
        total += Decimal::from(i % 1000);
    }

    let elapsed = start.elapsed();
    let per_op = elapsed.as_nanos() / iterations as u128;

    println!("decimal add: {} ns/op, total={}", per_op, total);
    assert!(per_op < 1_000, "decimal addition too slow: {} ns/op", per_op);
}
