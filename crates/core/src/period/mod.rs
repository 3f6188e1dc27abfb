//! Fiscal periods and their per-book close status.
//!
//! - Fiscal period definitions (calendar, year, number, date range)
//! - Period status state machine (OPEN / SOFT_CLOSED / HARD_CLOSED)
//! - Posting guard by status and privilege

pub mod error;
pub mod fiscal;
pub mod status;

pub use error::PeriodError;
pub use fiscal::FiscalPeriod;
pub use status::{CloseStatus, PeriodStatus, PostingPrivilege};
