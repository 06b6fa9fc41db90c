use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// TRANSFER moves value between two existing accounts; DEPOSIT is a system
/// credit from the fixed SystemFunding account (SPEC_FULL.md §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Transfer,
    Deposit,
}

/// Terminal status of a Transaction. PENDING -> SUCCESS | FAILED, never
/// further (spec.md §4.4 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

/// A logical transfer record (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub reference: Option<String>,
    pub status: TransactionStatus,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
        transaction_type: TransactionType,
        reference: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_account_id,
            to_account_id,
            amount,
            currency: currency.into(),
            transaction_type,
            reference,
            status: TransactionStatus::Pending,
            reason: None,
            description,
            created_at: Utc::now(),
        }
    }

    /// Compares this request's logical parameters against an existing
    /// transaction, for idempotency replay (spec.md §4.3, §4.4 step 1).
    pub fn matches_request(&self, from: Uuid, to: Uuid, amount: Decimal) -> bool {
        self.from_account_id == from && self.to_account_id == to && self.amount == amount
    }
}
