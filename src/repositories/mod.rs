pub mod account_repository;
pub mod ledger_repository;
pub mod transaction_repository;

pub use account_repository::AccountRepository;
pub use ledger_repository::LedgerRepository;
pub use transaction_repository::TransactionRepository;

use sqlx::PgPool;

/// Database connection pool type alias.
pub type DbPool = PgPool;
