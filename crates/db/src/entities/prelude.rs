//! Entity aliases.

pub use super::books::Entity as Books;
pub use super::chart_of_accounts::Entity as ChartOfAccounts;
pub use super::fiscal_calendars::Entity as FiscalCalendars;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_lines::Entity as JournalLines;
pub use super::period_close_runs::Entity as PeriodCloseRuns;
pub use super::period_statuses::Entity as PeriodStatuses;
