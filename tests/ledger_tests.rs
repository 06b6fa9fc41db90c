mod common;

use rust_decimal_macros::dec;
use wallet_engine::error::AppError;
use wallet_engine::models::{Account, AccountType, EntryType, Transaction, TransactionType};
use wallet_engine::repositories::{AccountRepository, TransactionRepository};
use wallet_engine::services::DoubleEntryRecorder;

#[tokio::test]
async fn test_recorder_record_transfer_writes_balanced_pair() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;

    let account_repo = AccountRepository::new(pool.clone());
    let tx_repo = TransactionRepository::new(pool.clone());
    let recorder = DoubleEntryRecorder::new(pool.clone(), None);

    let source = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create source");
    let dest = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create dest");

    let pending = Transaction::new_pending(source.id, dest.id, dec!(100), "USD", TransactionType::Transfer, None, None);

    let mut db_tx = pool.begin().await.expect("begin");
    let created = tx_repo.create(&mut db_tx, &pending).await.expect("create tx");
    let (debit, credit) = recorder
        .record_transfer(&mut db_tx, &created)
        .await
        .expect("record transfer");
    db_tx.commit().await.expect("commit");

    assert_eq!(debit.entry_type, EntryType::Debit);
    assert_eq!(debit.account_id, source.id);
    assert_eq!(credit.entry_type, EntryType::Credit);
    assert_eq!(credit.account_id, dest.id);
    assert_eq!(debit.amount, credit.amount);

    let source_balance = recorder.balance(source.id).await.expect("balance");
    assert_eq!(source_balance, dec!(-100));
    let dest_balance = recorder.balance(dest.id).await.expect("balance");
    assert_eq!(dest_balance, dec!(100));

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_recorder_record_transfer_is_idempotent_on_replay() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;

    let account_repo = AccountRepository::new(pool.clone());
    let tx_repo = TransactionRepository::new(pool.clone());
    let recorder = DoubleEntryRecorder::new(pool.clone(), None);

    let source = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create source");
    let dest = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create dest");
    let pending = Transaction::new_pending(source.id, dest.id, dec!(50), "USD", TransactionType::Transfer, None, None);

    let mut db_tx = pool.begin().await.expect("begin");
    let created = tx_repo.create(&mut db_tx, &pending).await.expect("create tx");
    let first = recorder.record_transfer(&mut db_tx, &created).await.expect("record transfer");
    let replay = recorder.record_transfer(&mut db_tx, &created).await.expect("replay");
    db_tx.commit().await.expect("commit");

    assert_eq!(first.0.id, replay.0.id);
    assert_eq!(first.1.id, replay.1.id);

    let debit_sum = recorder.balance(source.id).await.expect("balance");
    assert_eq!(debit_sum, dec!(-50));

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_recorder_record_system_credit_from_funding_account() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    common::ensure_system_funding_account(&pool).await;

    let account_repo = AccountRepository::new(pool.clone());
    let tx_repo = TransactionRepository::new(pool.clone());
    let recorder = DoubleEntryRecorder::new(pool.clone(), None);

    let dest = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create dest");
    let pending = Transaction::new_pending(
        wallet_engine::models::SYSTEM_FUNDING_ACCOUNT_ID,
        dest.id,
        dec!(200),
        "USD",
        TransactionType::Deposit,
        None,
        None,
    );

    let mut db_tx = pool.begin().await.expect("begin");
    let created = tx_repo.create(&mut db_tx, &pending).await.expect("create tx");
    let (debit, credit) = recorder
        .record_system_credit(&mut db_tx, &created)
        .await
        .expect("record system credit");
    db_tx.commit().await.expect("commit");

    assert_eq!(debit.account_id, wallet_engine::models::SYSTEM_FUNDING_ACCOUNT_ID);
    assert_eq!(credit.account_id, dest.id);

    let dest_balance = recorder.balance(dest.id).await.expect("balance");
    assert_eq!(dest_balance, dec!(200));

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_recorder_record_system_credit_rejects_non_positive_amount() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    common::ensure_system_funding_account(&pool).await;

    let account_repo = AccountRepository::new(pool.clone());
    let tx_repo = TransactionRepository::new(pool.clone());
    let recorder = DoubleEntryRecorder::new(pool.clone(), None);

    let dest = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create dest");

    let mut db_tx = pool.begin().await.expect("begin");
    let pending = Transaction::new_pending(
        wallet_engine::models::SYSTEM_FUNDING_ACCOUNT_ID,
        dest.id,
        dec!(0),
        "USD",
        TransactionType::Deposit,
        None,
        None,
    );
    let created = tx_repo.create(&mut db_tx, &pending).await.expect("create tx");
    let result = recorder.record_system_credit(&mut db_tx, &created).await;
    assert!(result.is_err());
    db_tx.rollback().await.expect("rollback");

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_recorder_verify_account_balance_mismatch_errors() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;

    let account_repo = AccountRepository::new(pool.clone());
    let recorder = DoubleEntryRecorder::new(pool.clone(), None);

    let account = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create account");

    let ok = recorder.verify_account_balance(account.id, dec!(0)).await;
    assert!(ok.is_ok());

    let err = recorder.verify_account_balance(account.id, dec!(500)).await;
    match err {
        Err(AppError::Transfer(wallet_engine::error::TransferError::BalanceVerification { account_id, expected, actual })) => {
            assert_eq!(account_id, account.id);
            assert_eq!(expected, dec!(500));
            assert_eq!(actual, dec!(0));
        }
        other => panic!("expected BalanceVerification error, got {other:?}"),
    }

    common::cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn test_recorder_invalidate_cache_is_noop_without_cache() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;

    let account_repo = AccountRepository::new(pool.clone());
    let recorder = DoubleEntryRecorder::new(pool.clone(), None);
    let account = account_repo.create(&Account::new("USD", AccountType::Main)).await.expect("create account");

    recorder.invalidate_cache(account.id).await;

    common::cleanup_test_data(&pool).await;
}
