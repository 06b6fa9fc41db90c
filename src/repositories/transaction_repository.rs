use crate::error::{AppError, Result, TransferError};
use crate::models::{Transaction, TransactionStatus, TransactionType};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Repository for Transaction persistence (spec.md C2/C4).
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new (PENDING) transaction within the caller's open
    /// transaction (spec.md §4.4 step 3). A race between two callers
    /// inserting the same reference is resolved by `idx_transactions_reference_ci`:
    /// the loser's unique violation is mapped to the duplicate-reference
    /// rule rather than surfaced as a database error (spec.md §5).
    pub async fn create(&self, conn: &mut PgConnection, transaction: &Transaction) -> Result<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.from_account_id)
        .bind(transaction.to_account_id)
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(transaction.transaction_type)
        .bind(&transaction.reference)
        .bind(transaction.status)
        .bind(&transaction.reason)
        .bind(&transaction.description)
        .bind(transaction.created_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Transfer(TransferError::InvalidTransaction {
                    kind: "duplicate_reference",
                    detail: format!(
                        "reference {:?} was claimed by a concurrent transaction",
                        transaction.reference
                    ),
                })
            }
            _ => AppError::Database(e),
        })?;

        Ok(row)
    }

    /// Moves a transaction to its terminal status (SUCCESS), within the
    /// caller's open transaction (spec.md §9.1: a failed transfer rolls
    /// back entirely, so this is never called with FAILED).
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: TransactionStatus,
        reason: Option<&str>,
    ) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2, reason = $3
            WHERE id = $1
            RETURNING id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Looks up a transaction by reference, case-insensitively, within the
    /// caller's open transaction. The uniqueness guarantee comes from the
    /// `idx_transactions_reference_ci` unique index, not from this query —
    /// this just finds the existing row for idempotent replay (spec.md §4.3,
    /// §4.4 step 1).
    pub async fn find_by_reference_ci(
        &self,
        conn: &mut PgConnection,
        reference: &str,
    ) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at
            FROM transactions
            WHERE LOWER(reference) = LOWER($1)
            "#,
        )
        .bind(reference)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Transactions touching an account (as source or destination), most
    /// recent first (spec.md C5 TransactionHistory).
    pub async fn find_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at
            FROM transactions
            WHERE from_account_id = $1 OR to_account_id = $1
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

    /// Lists transactions with optional filters, for ad-hoc reporting.
    pub async fn list(
        &self,
        transaction_type: Option<TransactionType>,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, currency, transaction_type, reference, status, reason, description, created_at
            FROM transactions
            WHERE ($1::transaction_type IS NULL OR transaction_type = $1)
              AND ($2::transaction_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(transaction_type)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }
}
