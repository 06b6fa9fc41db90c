use crate::error::{Result, TransferError};
use crate::models::{LedgerEntry, Transaction};
use crate::repositories::{AccountRepository, LedgerRepository, TransactionRepository};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A transaction plus its ledger entries (0 while PENDING/FAILED, 2 after
/// SUCCESS) — spec.md C5 `TransactionHistory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub transaction: Transaction,
    pub entries: Vec<LedgerEntry>,
}

/// One ledger line annotated with its running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLine {
    pub entry: LedgerEntry,
    pub running_balance: Decimal,
}

/// A page of an account's ledger, newest-first, each line carrying the
/// balance as of and including that entry — spec.md C5 `AccountLedger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedger {
    pub account_id: Uuid,
    pub current_balance: Decimal,
    pub entries: Vec<LedgerLine>,
    pub page_size: i64,
    pub page_number: i64,
}

/// A per-period summary — spec.md C5 `AccountStatement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
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

/// Read-only views over the ledger (spec.md C5). Never mutates.
pub struct Reporter {
    account_repo: AccountRepository,
    transaction_repo: TransactionRepository,
    ledger_repo: LedgerRepository,
}

impl Reporter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            account_repo: AccountRepository::new(pool.clone()),
            transaction_repo: TransactionRepository::new(pool.clone()),
            ledger_repo: LedgerRepository::new(pool),
        }
    }

    pub async fn transaction_history(&self, transaction_id: Uuid) -> Result<TransactionHistory> {
        let transaction = self
            .transaction_repo
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| crate::error::AppError::NotFound(format!("transaction {transaction_id} not found")))?;

        let entries = self.ledger_repo.find_by_transaction(transaction_id).await?;

        Ok(TransactionHistory { transaction, entries })
    }

    /// Computes a running balance over the account's full chronological
    /// history, then returns the requested newest-first page.
    pub async fn account_ledger(&self, account_id: Uuid, page_size: i64, page_number: i64) -> Result<AccountLedger> {
        self.account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(TransferError::AccountNotFound(account_id))?;

        let all = self.ledger_repo.find_all_by_account_chronological(account_id).await?;

        let mut running = Decimal::ZERO;
        let mut lines: Vec<LedgerLine> = Vec::with_capacity(all.len());
        for entry in all {
            running += entry.signed_amount();
            lines.push(LedgerLine { entry, running_balance: running });
        }
        let current_balance = running;

        lines.reverse();
        let page_size = page_size.max(1);
        let offset = ((page_number.max(1) - 1) * page_size) as usize;
        let page = lines.into_iter().skip(offset).take(page_size as usize).collect();

        Ok(AccountLedger {
            account_id,
            current_balance,
            entries: page,
            page_size,
            page_number: page_number.max(1),
        })
    }

    pub async fn account_statement(
        &self,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AccountStatement> {
        self.account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(TransferError::AccountNotFound(account_id))?;

        let opening_balance = self.ledger_repo.calculate_balance_before(account_id, start).await?;
        let entries = self
            .ledger_repo
            .find_by_account_chronological(account_id, start, end)
            .await?;

        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;
        for entry in &entries {
            match entry.entry_type {
                crate::models::EntryType::Debit => total_debits += entry.amount,
                crate::models::EntryType::Credit => total_credits += entry.amount,
            }
        }

        let closing_balance = opening_balance + total_credits - total_debits;

        Ok(AccountStatement {
            account_id,
            start,
            end,
            opening_balance,
            closing_balance,
            total_debits,
            total_credits,
            entry_count: entries.len() as i64,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn running_balance_accumulates_in_chronological_order() {
        let account_id = Uuid::new_v4();
        let tx_id = Uuid::new_v4();
        let entries = vec![
            LedgerEntry::credit(tx_id, account_id, dec!(100), "EUR", None),
            LedgerEntry::debit(tx_id, account_id, dec!(30), "EUR", None),
        ];

        let mut running = Decimal::ZERO;
        let mut lines = Vec::new();
        for entry in entries {
            running += entry.signed_amount();
            lines.push(running);
        }

        assert_eq!(lines, vec![dec!(100), dec!(70)]);
    }
}
