//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every write that touches a period runs in a SERIALIZABLE transaction with a
//! bounded `lock_timeout`; see [`begin_serializable`].

pub mod account;
pub mod book;
pub mod close_run;
pub mod fiscal_period;
pub mod journal;
pub mod period_status;

pub use account::AccountRepository;
pub use book::BookRepository;
pub use close_run::CloseRunRepository;
pub use fiscal_period::FiscalPeriodRepository;
pub use journal::JournalRepository;
pub use period_status::PeriodStatusRepository;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel,
    TransactionTrait,
};

/// Lock wait used when none is configured.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Begins a SERIALIZABLE transaction whose lock waits give up after
/// `lock_timeout_ms` with SQLSTATE 55P03.
///
/// # Errors
///
/// Returns an error if the transaction cannot be started.
pub async fn begin_serializable(
    db: &DatabaseConnection,
    lock_timeout_ms: u64,
) -> Result<DatabaseTransaction, DbErr> {
    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;
    txn.execute_unprepared(&format!("SET LOCAL lock_timeout = {lock_timeout_ms}"))
        .await?;
    Ok(txn)
}
