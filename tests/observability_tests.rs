mod common;

use wallet_engine::observability::{AggregatedHealth, HealthChecker, HealthStatus};

fn redis_client() -> redis::Client {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    redis::Client::open(url).expect("failed to build redis client")
}

#[tokio::test]
async fn test_health_checker_reports_database_healthy() {
    let pool = common::setup_test_db().await;
    let checker = HealthChecker::new(pool, redis_client());

    let health = checker.check_database().await;
    assert_eq!(health.name, "database");
    assert!(health.status.is_healthy() || health.status.is_degraded());
}

#[tokio::test]
async fn test_health_checker_aggregates_dependencies() {
    let pool = common::setup_test_db().await;
    let checker = HealthChecker::new(pool, redis_client());

    let health: AggregatedHealth = checker.check_all().await;
    assert_eq!(health.dependencies.len(), 2);
    assert_ne!(health.status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_health_checker_is_alive_always_true() {
    let pool = common::setup_test_db().await;
    let checker = HealthChecker::new(pool, redis_client());
    assert!(checker.is_alive());
}

#[tokio::test]
async fn test_health_checker_uptime_increases() {
    let pool = common::setup_test_db().await;
    let checker = HealthChecker::new(pool, redis_client());
    let first = checker.uptime_seconds();
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let second = checker.uptime_seconds();
    assert!(second >= first);
}
