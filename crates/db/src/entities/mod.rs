//! `SeaORM` entity definitions.

pub mod prelude;

pub mod books;
pub mod chart_of_accounts;
pub mod fiscal_calendars;
pub mod fiscal_periods;
pub mod journal_entries;
pub mod journal_lines;
pub mod period_close_runs;
pub mod period_statuses;
pub mod sea_orm_active_enums;
