pub mod account;
pub mod ledger_entry;
pub mod transaction;

pub use account::{Account, AccountType, SYSTEM_FUNDING_ACCOUNT_ID};
pub use ledger_entry::{EntryType, LedgerEntry};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
