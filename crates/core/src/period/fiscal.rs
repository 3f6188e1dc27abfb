//! Fiscal period definitions.

use chrono::NaiveDate;
use closebook_shared::types::{CalendarId, FiscalPeriodId};
use serde::{Deserialize, Serialize};

/// A period of a fiscal calendar. Calendars are shared by books, statuses are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Calendar this period belongs to.
    pub calendar_id: CalendarId,
    /// Fiscal year, e.g. 2026.
    pub fiscal_year: i32,
    /// Period number within the year (1-12 for monthly, 13 for adjustments).
    pub period_no: i32,
    /// Adjustment periods share dates with the last regular period.
    pub is_adjustment: bool,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
}

impl FiscalPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns a label such as "2026-03".
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.fiscal_year, self.period_no)
    }
}
