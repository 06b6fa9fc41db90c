use crate::error::{Result, TransferError};
use crate::models::{Account, Transaction};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Outcome of an idempotency-key lookup.
pub enum IdempotencyOutcome {
    /// No existing transaction carries this reference.
    None,
    /// An existing transaction matches the request exactly; replay it.
    Reuse(Transaction),
}

/// Pure pre-checks, run once unlocked and (for sufficient-funds) again under
/// the row lock (spec.md C3). Stateless — every method takes already-fetched
/// entities so the engine controls all I/O.
pub struct Validator;

impl Validator {
    /// Cross-checks a reference match against the requested parameters. On
    /// mismatch the reference is claimed by a different logical transfer
    /// (spec.md §4.3 last row, §4.4 step 1).
    pub fn check_idempotency(
        existing: Option<Transaction>,
        from: Uuid,
        to: Uuid,
        amount: Decimal,
    ) -> Result<IdempotencyOutcome> {
        match existing {
            None => Ok(IdempotencyOutcome::None),
            Some(tx) if tx.matches_request(from, to, amount) => Ok(IdempotencyOutcome::Reuse(tx)),
            Some(_) => Err(TransferError::InvalidTransaction {
                kind: "duplicate_reference",
                detail: "reference already used with different parameters".to_string(),
            }
            .into()),
        }
    }

    /// Amount positivity, independent of which accounts are involved.
    pub fn validate_amount(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidTransaction {
                kind: "non_positive_amount",
                detail: format!("amount must be positive, got {amount}"),
            }
            .into());
        }
        Ok(())
    }

    /// Self-transfer and currency-match checks between two real accounts.
    /// Not applied to DEPOSIT, whose source is the fixed SystemFunding
    /// account rather than a currency-bearing counter-party
    /// (SPEC_FULL.md §3.1).
    pub fn validate_transfer_accounts(from: &Account, to: &Account) -> Result<()> {
        if from.id == to.id {
            return Err(TransferError::InvalidTransaction {
                kind: "self_transfer",
                detail: "source and destination accounts must differ".to_string(),
            }
            .into());
        }

        if from.currency != to.currency {
            return Err(TransferError::CurrencyMismatch {
                from: from.currency.clone(),
                to: to.currency.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Checks `amount` against `account`'s withdrawal policy, given its
    /// current derived balance (spec.md §4.3, AccountType::max_withdrawal).
    pub fn validate_sufficient_funds(account: &Account, current_balance: Decimal, amount: Decimal) -> Result<()> {
        match account.account_type.max_withdrawal(current_balance) {
            Some(limit) if amount > limit => Err(TransferError::InsufficientFunds {
                account_id: account.id,
                reason: format!("requested {amount}, max withdrawal {limit}"),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use rust_decimal_macros::dec;

    fn account(currency: &str, account_type: AccountType) -> Account {
        Account::new(currency, account_type)
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert!(Validator::validate_amount(dec!(0)).is_err());
        assert!(Validator::validate_amount(dec!(-1)).is_err());
        assert!(Validator::validate_amount(dec!(0.01)).is_ok());
    }

    #[test]
    fn rejects_self_transfer() {
        let a = account("EUR", AccountType::Main);
        assert!(Validator::validate_transfer_accounts(&a, &a).is_err());
    }

    #[test]
    fn rejects_currency_mismatch() {
        let a = account("EUR", AccountType::Main);
        let b = account("USD", AccountType::Main);
        assert!(Validator::validate_transfer_accounts(&a, &b).is_err());
    }

    #[test]
    fn accepts_matching_currency_distinct_accounts() {
        let a = account("EUR", AccountType::Main);
        let b = account("EUR", AccountType::Main);
        assert!(Validator::validate_transfer_accounts(&a, &b).is_ok());
    }

    #[test]
    fn insufficient_funds_on_pending_account() {
        let a = account("EUR", AccountType::Pending);
        assert!(Validator::validate_sufficient_funds(&a, dec!(100), dec!(1)).is_err());
    }

    #[test]
    fn sufficient_funds_within_balance() {
        let a = account("EUR", AccountType::Main);
        assert!(Validator::validate_sufficient_funds(&a, dec!(100), dec!(100)).is_ok());
        assert!(Validator::validate_sufficient_funds(&a, dec!(100), dec!(100.01)).is_err());
    }

    #[test]
    fn system_account_never_insufficient() {
        let a = account("EUR", AccountType::System);
        assert!(Validator::validate_sufficient_funds(&a, dec!(0), dec!(1_000_000)).is_ok());
    }

    #[test]
    fn idempotency_reuses_matching_transaction() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let tx = Transaction::new_pending(from, to, dec!(10), "EUR", crate::models::TransactionType::Transfer, Some("R1".into()), None);

        match Validator::check_idempotency(Some(tx.clone()), from, to, dec!(10)).unwrap() {
            IdempotencyOutcome::Reuse(reused) => assert_eq!(reused.id, tx.id),
            IdempotencyOutcome::None => panic!("expected reuse"),
        }
    }

    #[test]
    fn idempotency_rejects_mismatched_parameters() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let other = Uuid::new_v4();
        let tx = Transaction::new_pending(from, to, dec!(10), "EUR", crate::models::TransactionType::Transfer, Some("R1".into()), None);

        assert!(Validator::check_idempotency(Some(tx), from, other, dec!(10)).is_err());
    }
}
