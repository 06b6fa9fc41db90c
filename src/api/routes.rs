use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

use super::handlers;
use crate::cache::BalanceCache;
use crate::observability::HealthChecker;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis_client: redis::Client,
    pub cache: Option<Arc<BalanceCache>>,
    pub metrics_handle: Option<PrometheusHandle>,
    pub health_checker: Option<Arc<HealthChecker>>,
}

impl AppState {
    pub fn new(pool: PgPool, redis_client: redis::Client, cache: Option<Arc<BalanceCache>>) -> Self {
        Self {
            pool,
            redis_client,
            cache,
            metrics_handle: None,
            health_checker: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    pub fn with_health_checker(mut self, checker: Arc<HealthChecker>) -> Self {
        self.health_checker = Some(checker);
        self
    }
}

/// Builds the HTTP façade over the wallet core (spec.md §6, SPEC_FULL.md §6.1).
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/accounts", post(handlers::create_account))
        .route("/accounts/:id/balance", get(handlers::get_account_balance))
        .route("/accounts/:id/transactions", get(handlers::get_account_transactions))
        .route("/accounts/:id/deposit", post(handlers::deposit))
        .route("/transfers", post(handlers::transfer))
        .route("/transactions/reference/:reference", get(handlers::get_transaction_by_reference))
        .route("/reports/transactions/:id", get(handlers::transaction_history))
        .route("/reports/accounts/:id/ledger", get(handlers::account_ledger))
        .route("/reports/accounts/:id/statement", get(handlers::account_statement))
        .with_state(state)
}
