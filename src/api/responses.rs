use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Account, LedgerEntry, Transaction};
use crate::services::{AccountLedger, AccountStatement, LedgerLine, TransactionHistory};

/// `GET /accounts/{id}/balance` body.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

/// Liveness/readiness body (SPEC_FULL.md §6.1). Carries no business
/// semantics — ambient only.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerLineResponse {
    pub entry: LedgerEntry,
    pub running_balance: Decimal,
}

impl From<LedgerLine> for LedgerLineResponse {
    fn from(line: LedgerLine) -> Self {
        Self {
            entry: line.entry,
            running_balance: line.running_balance,
        }
    }
}

/// `GET /reports/accounts/{id}/ledger` body.
#[derive(Debug, Clone, Serialize)]
pub struct AccountLedgerResponse {
    pub account_id: Uuid,
    pub current_balance: Decimal,
    pub entries: Vec<LedgerLineResponse>,
    pub page_size: i64,
    pub page_number: i64,
}

impl From<AccountLedger> for AccountLedgerResponse {
    fn from(ledger: AccountLedger) -> Self {
        Self {
            account_id: ledger.account_id,
            current_balance: ledger.current_balance,
            entries: ledger.entries.into_iter().map(LedgerLineResponse::from).collect(),
            page_size: ledger.page_size,
            page_number: ledger.page_number,
        }
    }
}

/// `GET /reports/accounts/{id}/statement` body.
#[derive(Debug, Clone, Serialize)]
pub struct AccountStatementResponse {
    pub account_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub entry_count: i64,
    pub entries: Vec<LedgerEntry>,
}

impl From<AccountStatement> for AccountStatementResponse {
    fn from(statement: AccountStatement) -> Self {
        Self {
            account_id: statement.account_id,
            start: statement.start,
            end: statement.end,
            opening_balance: statement.opening_balance,
            closing_balance: statement.closing_balance,
            total_debits: statement.total_debits,
            total_credits: statement.total_credits,
            entry_count: statement.entry_count,
            entries: statement.entries,
        }
    }
}

/// `GET /reports/transactions/{id}` body.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHistoryResponse {
    pub transaction: Transaction,
    pub entries: Vec<LedgerEntry>,
}

impl From<TransactionHistory> for TransactionHistoryResponse {
    fn from(history: TransactionHistory) -> Self {
        Self {
            transaction: history.transaction,
            entries: history.entries,
        }
    }
}
