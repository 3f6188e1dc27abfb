//! Classification of database errors.
//!
//! Lock timeouts, serialization failures, deadlocks and unique violations all
//! mean another request touched the same key first. They surface as retryable
//! conflicts; everything else is an internal database error.

use closebook_core::close::CloseError;
use closebook_core::ledger::LedgerError;
use closebook_shared::types::{BookId, FiscalPeriodId};
use sea_orm::{DbErr, RuntimeErr, SqlErr};

/// `serialization_failure`
pub const SERIALIZATION_FAILURE: &str = "40001";
/// `deadlock_detected`
pub const DEADLOCK_DETECTED: &str = "40P01";
/// `lock_not_available`, raised when `lock_timeout` expires.
pub const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Returns the Postgres SQLSTATE carried by the error, if any.
#[must_use]
pub fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        RuntimeErr::Internal(_) => None,
    }
}

/// Returns true if the error means a concurrent request won a race.
#[must_use]
pub fn is_conflict(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    matches!(
        sqlstate(err).as_deref(),
        Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE)
    )
}

/// Maps a database error raised while posting or reversing.
pub fn ledger_error(err: DbErr) -> LedgerError {
    if is_conflict(&err) {
        tracing::warn!(error = %err, "Concurrent journal modification");
        LedgerError::ConcurrentModification
    } else {
        tracing::error!(error = %err, "Journal database error");
        LedgerError::Database(err.to_string())
    }
}

/// Maps a database error raised while closing or reopening a period.
pub fn close_error(err: DbErr, book_id: BookId, fiscal_period_id: FiscalPeriodId) -> CloseError {
    if is_conflict(&err) {
        tracing::warn!(
            book_id = %book_id,
            fiscal_period_id = %fiscal_period_id,
            error = %err,
            "Concurrent close or reopen"
        );
        CloseError::ConcurrentClose {
            book_id,
            fiscal_period_id,
        }
    } else {
        tracing::error!(
            book_id = %book_id,
            fiscal_period_id = %fiscal_period_id,
            error = %err,
            "Close database error"
        );
        CloseError::Database(err.to_string())
    }
}
