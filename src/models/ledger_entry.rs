use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    pub fn opposite(&self) -> EntryType {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }

    /// Signed multiplier used when deriving a balance: credits add, debits
    /// subtract (spec.md §3: balance = Σcredit - Σdebit).
    pub fn sign(&self) -> i32 {
        match self {
            EntryType::Credit => 1,
            EntryType::Debit => -1,
        }
    }
}

/// An immutable ledger entry (spec.md §3). Never modified or deleted once
/// written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn debit(
        transaction_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self::new(transaction_id, account_id, EntryType::Debit, amount, currency, description)
    }

    pub fn credit(
        transaction_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self::new(transaction_id, account_id, EntryType::Credit, amount, currency, description)
    }

    fn new(
        transaction_id: Uuid,
        account_id: Uuid,
        entry_type: EntryType,
        amount: Decimal,
        currency: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            transaction_id,
            entry_type,
            amount,
            currency: currency.into(),
            description,
            created_at: Utc::now(),
        }
    }

    /// Signed contribution of this entry to its account's balance.
    pub fn signed_amount(&self) -> Decimal {
        self.amount * Decimal::from(self.entry_type.sign())
    }
}
