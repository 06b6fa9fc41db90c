use crate::error::{AppError, Result};
use crate::models::{Account, AccountType};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Repository for Account persistence (spec.md C1).
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new account.
    pub async fn create(&self, account: &Account) -> Result<Account> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, currency, account_type, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, currency, account_type, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.currency)
        .bind(account.account_type)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Finds an account by ID without locking. Use `get_for_update` when the
    /// account is about to be debited or credited.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, currency, account_type, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Locks an account row within an open transaction via `SELECT ... FOR
    /// UPDATE`. Callers must acquire locks in ascending account-id order
    /// across the whole transfer to avoid deadlocks (spec.md §4.4 step 2).
    pub async fn get_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, currency, account_type, created_at
            FROM accounts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Lists accounts with optional type/currency filters.
    pub async fn list(
        &self,
        account_type: Option<AccountType>,
        currency: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, currency, account_type, created_at
            FROM accounts
            WHERE ($1::account_type IS NULL OR account_type = $1)
              AND ($2::text IS NULL OR currency = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(account_type)
        .bind(currency)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }
}
