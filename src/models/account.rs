use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The fixed account used as the counter-party for system credits
/// (spec.md §9, "Global mutable state").
pub const SYSTEM_FUNDING_ACCOUNT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_00000000_0001);

/// Account types, each with a withdrawal policy (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// May withdraw up to the current balance.
    Main,
    /// May withdraw up to the current balance (external expiry not modeled).
    Bonus,
    /// Withdrawals disallowed.
    Pending,
    /// Withdrawals disallowed.
    Jackpot,
    /// Unbounded withdrawal; counter-party for system credits.
    System,
}

impl AccountType {
    /// Maximum amount this account type may have debited, given its current
    /// derived balance. `None` means unbounded.
    pub fn max_withdrawal(&self, current_balance: Decimal) -> Option<Decimal> {
        match self {
            AccountType::Main | AccountType::Bonus => Some(current_balance),
            AccountType::Pending | AccountType::Jackpot => Some(Decimal::ZERO),
            AccountType::System => None,
        }
    }
}

/// A monetary account. Balance is never stored here — it is derived from
/// ledger entries (spec.md §3, §9).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub currency: String,
    #[sqlx(rename = "account_type")]
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(currency: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency: currency.into(),
            account_type,
            created_at: Utc::now(),
        }
    }
}
