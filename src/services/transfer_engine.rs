use crate::cache::BalanceCache;
use crate::error::{AppError, Result, TransferError};
use crate::models::{Account, Transaction, TransactionStatus, TransactionType, SYSTEM_FUNDING_ACCOUNT_ID};
use crate::repositories::{AccountRepository, TransactionRepository};
use crate::services::recorder::DoubleEntryRecorder;
use crate::services::validator::{IdempotencyOutcome, Validator};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Drives a single transfer from request to terminal state (spec.md C4).
pub struct TransferEngine {
    pool: PgPool,
    account_repo: AccountRepository,
    transaction_repo: TransactionRepository,
    recorder: DoubleEntryRecorder,
}

impl TransferEngine {
    pub fn new(pool: PgPool, cache: Option<Arc<BalanceCache>>) -> Self {
        Self {
            account_repo: AccountRepository::new(pool.clone()),
            transaction_repo: TransactionRepository::new(pool.clone()),
            recorder: DoubleEntryRecorder::new(pool.clone(), cache),
            pool,
        }
    }

    /// `Transfer(from, to, amount, reference?, description?) -> Transaction`
    /// (spec.md §4.4).
    pub async fn transfer(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
        description: Option<String>,
    ) -> Result<Transaction> {
        self.execute(from_id, to_id, amount, TransactionType::Transfer, reference, description)
            .await
    }

    /// A system credit from the fixed SystemFunding account, sharing the
    /// transfer algorithm (SPEC_FULL.md §3.1).
    pub async fn deposit(
        &self,
        to_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
        description: Option<String>,
    ) -> Result<Transaction> {
        self.execute(
            SYSTEM_FUNDING_ACCOUNT_ID,
            to_id,
            amount,
            TransactionType::Deposit,
            reference,
            description,
        )
        .await
    }

    async fn execute(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        amount: Decimal,
        transaction_type: TransactionType,
        reference: Option<String>,
        description: Option<String>,
    ) -> Result<Transaction> {
        Validator::validate_amount(amount)?;

        // Step 1: idempotency lookup, outside the locking transaction.
        if let Some(reference) = reference.as_deref() {
            let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
            let existing = self
                .transaction_repo
                .find_by_reference_ci(&mut conn, reference)
                .await?;
            if let IdempotencyOutcome::Reuse(tx) =
                Validator::check_idempotency(existing, from_id, to_id, amount)?
            {
                return Ok(tx);
            }
        }

        // Step 2: pre-validation against unlocked accounts.
        let from_account = self
            .account_repo
            .find_by_id(from_id)
            .await?
            .ok_or(TransferError::AccountNotFound(from_id))?;
        let to_account = self
            .account_repo
            .find_by_id(to_id)
            .await?
            .ok_or(TransferError::AccountNotFound(to_id))?;

        if matches!(transaction_type, TransactionType::Transfer) {
            Validator::validate_transfer_accounts(&from_account, &to_account)?;
            let unlocked_balance = self.recorder.balance(from_id).await?;
            Validator::validate_sufficient_funds(&from_account, unlocked_balance, amount)?;
        }

        // Step 3: build the pending transaction in memory.
        let currency = match transaction_type {
            TransactionType::Transfer => from_account.currency.clone(),
            TransactionType::Deposit => to_account.currency.clone(),
        };
        let tx = Transaction::new_pending(
            from_id,
            to_id,
            amount,
            currency,
            transaction_type,
            reference,
            description,
        );

        // Steps 4-8, rolled back as a unit on any failure.
        match self
            .execute_locked(&tx, &from_account, &to_account, transaction_type)
            .await
        {
            Ok(success) => Ok(success),
            Err(err) => {
                // Nothing was committed — no Transaction row and no ledger
                // entries exist for `tx.id` (spec.md §9.1, "FAILED persistence").
                tracing::warn!(transaction_id = %tx.id, error = %err, "transfer failed, rolled back");
                Err(err)
            }
        }
    }

    async fn execute_locked(
        &self,
        tx: &Transaction,
        from_account: &Account,
        to_account: &Account,
        transaction_type: TransactionType,
    ) -> Result<Transaction> {
        let mut db_tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *db_tx)
            .await
            .map_err(AppError::Database)?;

        // Step 5: ordered locking, lexicographic on account id.
        let (first, second) = if from_account.id <= to_account.id {
            (from_account.id, to_account.id)
        } else {
            (to_account.id, from_account.id)
        };
        self.account_repo
            .get_for_update(&mut db_tx, first)
            .await?
            .ok_or(TransferError::AccountNotFound(first))?;
        if second != first {
            self.account_repo
                .get_for_update(&mut db_tx, second)
                .await?
                .ok_or(TransferError::AccountNotFound(second))?;
        }

        // Step 6: re-validate under lock.
        if matches!(transaction_type, TransactionType::Transfer) {
            let locked_balance = self
                .recorder
                .balance_under_lock(&mut db_tx, from_account.id)
                .await?;
            Validator::validate_sufficient_funds(from_account, locked_balance, tx.amount)?;
        }

        self.transaction_repo.create(&mut db_tx, tx).await?;

        // Step 7: append the balanced entries.
        match transaction_type {
            TransactionType::Transfer => self.recorder.record_transfer(&mut db_tx, tx).await?,
            TransactionType::Deposit => self.recorder.record_system_credit(&mut db_tx, tx).await?,
        };

        // Step 8: mark SUCCESS and commit.
        let success = self
            .transaction_repo
            .update_status(&mut db_tx, tx.id, TransactionStatus::Success, None)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("transaction {} vanished mid-flight", tx.id)))?;

        db_tx.commit().await.map_err(AppError::Database)?;

        self.recorder.invalidate_cache(from_account.id).await;
        self.recorder.invalidate_cache(to_account.id).await;

        Ok(success)
    }
}
