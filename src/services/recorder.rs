use crate::cache::BalanceCache;
use crate::error::{Result, TransferError};
use crate::models::{EntryType, LedgerEntry, Transaction, SYSTEM_FUNDING_ACCOUNT_ID};
use crate::repositories::{AccountRepository, LedgerRepository};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;

/// Turns a Transaction into a balanced debit/credit pair and derives
/// account balances from the ledger (spec.md C2).
pub struct DoubleEntryRecorder {
    account_repo: AccountRepository,
    ledger_repo: LedgerRepository,
    cache: Option<Arc<BalanceCache>>,
}

impl DoubleEntryRecorder {
    pub fn new(pool: PgPool, cache: Option<Arc<BalanceCache>>) -> Self {
        Self {
            account_repo: AccountRepository::new(pool.clone()),
            ledger_repo: LedgerRepository::new(pool),
            cache,
        }
    }

    /// Appends the DEBIT/CREDIT pair for a TRANSFER inside the caller's open
    /// transaction. If entries already exist for `tx.id`, returns them
    /// unchanged instead of writing again (spec.md §4.2 idempotent replay).
    pub async fn record_transfer(
        &self,
        conn: &mut PgConnection,
        tx: &Transaction,
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        let existing = self.ledger_repo.find_by_transaction(tx.id).await?;
        if let Some(pair) = Self::existing_pair(&existing) {
            return Ok(pair);
        }

        if self.account_repo.find_by_id(tx.from_account_id).await?.is_none() {
            return Err(TransferError::AccountNotFound(tx.from_account_id).into());
        }
        if self.account_repo.find_by_id(tx.to_account_id).await?.is_none() {
            return Err(TransferError::AccountNotFound(tx.to_account_id).into());
        }

        let debit = LedgerEntry::debit(
            tx.id,
            tx.from_account_id,
            tx.amount,
            &tx.currency,
            tx.description.clone(),
        );
        let credit = LedgerEntry::credit(
            tx.id,
            tx.to_account_id,
            tx.amount,
            &tx.currency,
            tx.description.clone(),
        );

        self.ledger_repo
            .append_batch(conn, &[debit.clone(), credit.clone()])
            .await?;

        Ok((debit, credit))
    }

    /// Writes a CREDIT on `tx.to_account_id` and a DEBIT of the same amount
    /// on the fixed `SystemFunding` account, preserving Σdebits = Σcredits
    /// (spec.md §4.2 `RecordSystemCredit`, SPEC_FULL.md §3.1).
    pub async fn record_system_credit(
        &self,
        conn: &mut PgConnection,
        tx: &Transaction,
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        if tx.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidTransaction {
                kind: "non_positive_amount",
                detail: format!("amount must be positive, got {}", tx.amount),
            }
            .into());
        }

        let existing = self.ledger_repo.find_by_transaction(tx.id).await?;
        if let Some(pair) = Self::existing_pair(&existing) {
            return Ok(pair);
        }

        let debit = LedgerEntry::debit(
            tx.id,
            SYSTEM_FUNDING_ACCOUNT_ID,
            tx.amount,
            &tx.currency,
            tx.description.clone(),
        );
        let credit = LedgerEntry::credit(
            tx.id,
            tx.to_account_id,
            tx.amount,
            &tx.currency,
            tx.description.clone(),
        );

        self.ledger_repo
            .append_batch(conn, &[debit.clone(), credit.clone()])
            .await?;

        Ok((debit, credit))
    }

    fn existing_pair(entries: &[LedgerEntry]) -> Option<(LedgerEntry, LedgerEntry)> {
        let debit = entries
            .iter()
            .find(|e| e.entry_type == EntryType::Debit)
            .cloned()?;
        let credit = entries
            .iter()
            .find(|e| e.entry_type == EntryType::Credit)
            .cloned()?;
        Some((debit, credit))
    }

    /// Derived balance, served from cache when available. A cache read or
    /// write failure degrades to a cache miss rather than a user-visible
    /// error (SPEC_FULL.md §1.2) — the ledger is always the source of truth.
    pub async fn balance(&self, account_id: Uuid) -> Result<Decimal> {
        if let Some(cache) = &self.cache {
            match cache.get(account_id).await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(e) => tracing::warn!(account_id = %account_id, error = %e, "balance cache read failed"),
            }
        }

        let balance = self.ledger_repo.calculate_balance_readonly(account_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(account_id, balance).await {
                tracing::warn!(account_id = %account_id, error = %e, "balance cache write failed");
            }
        }

        Ok(balance)
    }

    pub async fn balance_by_currency(&self, account_id: Uuid, currency: &str) -> Result<Decimal> {
        self.ledger_repo.calculate_balance_by_currency(account_id, currency).await
    }

    /// Balance derived under the row lock already held by the caller —
    /// never served from cache, since it must reflect entries written
    /// earlier in this same transaction (spec.md §4.4 step 6).
    pub async fn balance_under_lock(&self, conn: &mut PgConnection, account_id: Uuid) -> Result<Decimal> {
        self.ledger_repo.calculate_balance(conn, account_id).await
    }

    pub async fn verify_balance(&self, account_id: Uuid, expected: Decimal) -> Result<bool> {
        Ok(self.balance(account_id).await? == expected)
    }

    /// Throws `BalanceVerification` on mismatch (spec.md §4.2, §7).
    pub async fn verify_account_balance(&self, account_id: Uuid, expected: Decimal) -> Result<()> {
        let actual = self.balance(account_id).await?;
        if actual != expected {
            return Err(TransferError::BalanceVerification {
                account_id,
                expected,
                actual,
            }
            .into());
        }
        Ok(())
    }

    /// Invalidates the cached balance for an account. Called after a
    /// committed write touching that account.
    pub async fn invalidate_cache(&self, account_id: Uuid) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate(account_id).await {
                tracing::warn!(account_id = %account_id, error = %e, "balance cache invalidation failed");
            }
        }
    }
}
