use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::requests::{
    CreateAccountRequest, DepositRequest, LedgerQuery, ListTransactionsQuery, StatementQuery,
    TransferRequest,
};
use crate::api::responses::{
    AccountLedgerResponse, AccountStatementResponse, BalanceResponse, HealthResponse,
    TransactionHistoryResponse,
};
use crate::error::{AppError, Result, TransferError};
use crate::models::{Account, Transaction};
use crate::repositories::{AccountRepository, TransactionRepository};
use crate::services::{DoubleEntryRecorder, Reporter, TransferEngine};

use super::routes::AppState;

/// Liveness probe.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let version = env!("CARGO_PKG_VERSION").to_string();
    let alive = state
        .health_checker
        .as_ref()
        .map(|checker| checker.is_alive())
        .unwrap_or(true);

    Json(HealthResponse {
        status: if alive { "healthy".to_string() } else { "unhealthy".to_string() },
        version,
        timestamp: chrono::Utc::now(),
    })
}

/// Readiness probe — Postgres and, if configured, Redis (SPEC_FULL.md §6.1).
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match &state.health_checker {
        Some(checker) if checker.is_ready().await => StatusCode::OK,
        Some(_) => StatusCode::SERVICE_UNAVAILABLE,
        None => StatusCode::OK,
    }
}

/// Prometheus exposition format.
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// `POST /accounts` (spec.md §6).
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    if request.currency.trim().len() != 3 {
        return Err(AppError::Validation(format!(
            "currency must be a 3-letter ISO 4217 code, got '{}'",
            request.currency
        )));
    }

    let repo = AccountRepository::new(state.pool.clone());
    let account = Account::new(request.currency, request.account_type);
    let created = repo.create(&account).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /accounts/{id}/balance` (spec.md §6).
pub async fn get_account_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceResponse>> {
    let account_repo = AccountRepository::new(state.pool.clone());
    account_repo
        .find_by_id(id)
        .await?
        .ok_or(TransferError::AccountNotFound(id))?;

    let recorder = DoubleEntryRecorder::new(state.pool.clone(), state.cache.clone());
    let balance = recorder.balance(id).await?;

    Ok(Json(BalanceResponse { balance }))
}

/// `GET /accounts/{id}/transactions` (spec.md §6).
pub async fn get_account_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>> {
    let account_repo = AccountRepository::new(state.pool.clone());
    account_repo
        .find_by_id(id)
        .await?
        .ok_or(TransferError::AccountNotFound(id))?;

    let transaction_repo = TransactionRepository::new(state.pool.clone());
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);
    let transactions = transaction_repo.find_by_account(id, limit, offset).await?;

    Ok(Json(transactions))
}

/// `POST /accounts/{id}/deposit` (SPEC_FULL.md §6.1).
pub async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<Transaction>> {
    let engine = TransferEngine::new(state.pool.clone(), state.cache.clone());
    let transaction = engine
        .deposit(id, request.amount, request.reference_id, request.description)
        .await?;

    Ok(Json(transaction))
}

/// `POST /transfers` (spec.md §6).
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<Transaction>> {
    let engine = TransferEngine::new(state.pool.clone(), state.cache.clone());
    let transaction = engine
        .transfer(
            request.from_account_id,
            request.to_account_id,
            request.amount,
            request.reference_id,
            request.description,
        )
        .await?;

    Ok(Json(transaction))
}

/// `GET /transactions/reference/{ref}` (spec.md §6, case-insensitive lookup).
pub async fn get_transaction_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Transaction>> {
    let transaction_repo = TransactionRepository::new(state.pool.clone());
    let mut conn = state.pool.acquire().await.map_err(AppError::Database)?;
    let transaction = transaction_repo
        .find_by_reference_ci(&mut conn, &reference)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no transaction with reference '{reference}'")))?;

    Ok(Json(transaction))
}

/// `GET /reports/transactions/{id}` (spec.md §6).
pub async fn transaction_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionHistoryResponse>> {
    let reporter = Reporter::new(state.pool.clone());
    let history = reporter.transaction_history(id).await?;

    Ok(Json(TransactionHistoryResponse::from(history)))
}

/// `GET /reports/accounts/{id}/ledger?pageSize&pageNumber` (spec.md §6).
pub async fn account_ledger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<AccountLedgerResponse>> {
    let reporter = Reporter::new(state.pool.clone());
    let page_size = query.page_size.unwrap_or(50).clamp(1, 500);
    let page_number = query.page_number.unwrap_or(1).max(1);

    let ledger = reporter.account_ledger(id, page_size, page_number).await?;

    Ok(Json(AccountLedgerResponse::from(ledger)))
}

/// `GET /reports/accounts/{id}/statement?startDate&endDate` (spec.md §6).
pub async fn account_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<AccountStatementResponse>> {
    let reporter = Reporter::new(state.pool.clone());
    let statement = reporter
        .account_statement(id, query.start_date, query.end_date)
        .await?;

    Ok(Json(AccountStatementResponse::from(statement)))
}
