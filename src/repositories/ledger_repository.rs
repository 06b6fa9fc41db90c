use crate::error::{AppError, Result};
use crate::models::{EntryType, LedgerEntry};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Repository for LedgerEntry operations (spec.md C2).
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends both legs of a transaction atomically, within the caller's
    /// open transaction. Never called outside a transfer's transactional
    /// scope (spec.md §4.4 step 5).
    pub async fn append_batch(
        &self,
        conn: &mut PgConnection,
        entries: &[LedgerEntry],
    ) -> Result<()> {
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (id, account_id, transaction_id, entry_type, amount, currency, description, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(entry.id)
            .bind(entry.account_id)
            .bind(entry.transaction_id)
            .bind(entry.entry_type)
            .bind(entry.amount)
            .bind(&entry.currency)
            .bind(&entry.description)
            .bind(entry.created_at)
            .execute(&mut *conn)
            .await
            .map_err(AppError::Database)?;
        }

        Ok(())
    }

    /// Finds all entries for a transaction.
    pub async fn find_by_transaction(&self, transaction_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, account_id, transaction_id, entry_type, amount, currency, description, created_at
            FROM ledger_entries
            WHERE transaction_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Entries for an account, most recent first (used as the AccountLedger
    /// report, spec.md C5).
    pub async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, account_id, transaction_id, entry_type, amount, currency, description, created_at
            FROM ledger_entries
            WHERE account_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Entries for an account in chronological order, for statement
    /// generation with a running balance (spec.md C5 AccountStatement).
    pub async fn find_by_account_chronological(
        &self,
        account_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, account_id, transaction_id, entry_type, amount, currency, description, created_at
            FROM ledger_entries
            WHERE account_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at, id
            "#,
        )
        .bind(account_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// All entries for an account in chronological order, unbounded. Used
    /// by the Reporter to compute a running balance per entry (spec.md C5
    /// AccountLedger).
    pub async fn find_all_by_account_chronological(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, account_id, transaction_id, entry_type, amount, currency, description, created_at
            FROM ledger_entries
            WHERE account_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Balance contributed by entries strictly before a point in time, used
    /// as a statement's opening balance (spec.md C5 AccountStatement).
    pub async fn calculate_balance_before(
        &self,
        account_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Decimal> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN entry_type = 'CREDIT' THEN amount ELSE -amount END
            ), 0)
            FROM ledger_entries
            WHERE account_id = $1 AND created_at < $2
            "#,
        )
        .bind(account_id)
        .bind(before)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    /// Derives an account's balance restricted to one currency (spec.md C1
    /// `CalculateBalanceByCurrency`). Since an account's currency is fixed
    /// at creation, this only differs from `calculate_balance_readonly` if
    /// entries were ever posted under a different currency than the
    /// account's own.
    pub async fn calculate_balance_by_currency(
        &self,
        account_id: Uuid,
        currency: &str,
    ) -> Result<Decimal> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN entry_type = 'CREDIT' THEN amount ELSE -amount END
            ), 0)
            FROM ledger_entries
            WHERE account_id = $1 AND currency = $2
            "#,
        )
        .bind(account_id)
        .bind(currency)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    /// Derives an account's balance as Σcredit − Σdebit over every entry
    /// ever posted (spec.md §3, §4.2 `Balance`). Takes the locking
    /// connection so this reflects exactly what was just written under the
    /// row lock.
    pub async fn calculate_balance(
        &self,
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<Decimal> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN entry_type = 'CREDIT' THEN amount ELSE -amount END
            ), 0)
            FROM ledger_entries
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    /// Read-only balance derivation against the pool, for reporting
    /// endpoints that don't need a row lock (spec.md C5).
    pub async fn calculate_balance_readonly(&self, account_id: Uuid) -> Result<Decimal> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN entry_type = 'CREDIT' THEN amount ELSE -amount END
            ), 0)
            FROM ledger_entries
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    /// Sum of entries of one direction for an account (building block for
    /// `VerifyBalance`).
    pub async fn sum_by_account_and_type(
        &self,
        account_id: Uuid,
        entry_type: EntryType,
    ) -> Result<Decimal> {
        let row: (Option<Decimal>,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM ledger_entries
            WHERE account_id = $1 AND entry_type = $2
            "#,
        )
        .bind(account_id)
        .bind(entry_type)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0.unwrap_or(Decimal::ZERO))
    }

    /// Verifies debits equal credits for a transaction (double-entry
    /// invariant, spec.md §3).
    pub async fn verify_transaction_balance(&self, transaction_id: Uuid) -> Result<bool> {
        let row: (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN entry_type = 'DEBIT' THEN amount ELSE 0 END), 0) AS debits,
                COALESCE(SUM(CASE WHEN entry_type = 'CREDIT' THEN amount ELSE 0 END), 0) AS credits
            FROM ledger_entries
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.0 == row.1)
    }
}
