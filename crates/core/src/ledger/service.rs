//! Ledger service for journal validation.
//!
//! This module provides the core business logic for validating journal
//! entries before they are persisted to the database.

use closebook_shared::types::{AccountId, JournalEntryId, OrganizationId};

use super::error::LedgerError;
use super::types::{
    AccountInfo, Book, JournalLineInput, JournalStatus, JournalTotals, PostJournalInput,
};
use super::validation;
use crate::period::{FiscalPeriod, PeriodStatus, PostingPrivilege};

/// Book, period and period status a journal is posted into.
#[derive(Debug, Clone, Copy)]
pub struct PostingContext<'a> {
    /// Target book.
    pub book: &'a Book,
    /// Target fiscal period.
    pub period: &'a FiscalPeriod,
    /// Current status of the period within the book.
    pub status: PeriodStatus,
    /// Who is posting.
    pub privilege: PostingPrivilege,
}

/// Ledger service for journal validation.
///
/// This service contains pure business logic with no database dependencies.
/// Account lookups are supplied by the caller.
pub struct LedgerService;

impl LedgerService {
    /// Validate a journal for posting.
    ///
    /// Steps:
    /// 1. Book belongs to the caller's organization and the period to its calendar
    /// 2. Period status admits the posting
    /// 3. Header (description, currency, entry date inside the period)
    /// 4. Each line's amounts
    /// 5. Each line's account (exists in the organization, allows posting)
    /// 6. Debits equal credits in base currency within tolerance
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_posting<A>(
        input: &PostJournalInput,
        ctx: &PostingContext<'_>,
        account_lookup: A,
    ) -> Result<JournalTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        Self::validate_target(input.organization_id, ctx.book, ctx.period)?;
        ctx.status.ensure_can_post(ctx.privilege)?;
        Self::validate_header(input, ctx.period)?;

        let totals = validation::validate_lines(&input.lines)?;
        Self::validate_accounts(&input.lines, input.organization_id, &account_lookup)?;
        validation::validate_balance(&totals)?;

        Ok(totals)
    }

    /// Validate a journal for saving as a draft.
    ///
    /// Drafts are not part of the ledger, so balance and period status are not
    /// checked. Everything else is.
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_draft<A>(
        input: &PostJournalInput,
        book: &Book,
        period: &FiscalPeriod,
        account_lookup: A,
    ) -> Result<JournalTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        Self::validate_target(input.organization_id, book, period)?;
        Self::validate_header(input, period)?;
        let totals = validation::validate_lines(&input.lines)?;
        Self::validate_accounts(&input.lines, input.organization_id, &account_lookup)?;
        Ok(totals)
    }

    /// Checks that the book is visible to the organization and the period is
    /// part of the book's calendar.
    ///
    /// # Errors
    ///
    /// `BookNotFound` for a foreign book, `PeriodNotInBookCalendar` for a period
    /// of another calendar.
    pub fn validate_target(
        organization_id: OrganizationId,
        book: &Book,
        period: &FiscalPeriod,
    ) -> Result<(), LedgerError> {
        if book.organization_id != organization_id {
            return Err(LedgerError::BookNotFound(book.id));
        }
        if period.calendar_id != book.calendar_id {
            return Err(LedgerError::PeriodNotInBookCalendar {
                book_id: book.id,
                fiscal_period_id: period.id,
            });
        }
        Ok(())
    }

    fn validate_header(input: &PostJournalInput, period: &FiscalPeriod) -> Result<(), LedgerError> {
        if input.description.trim().is_empty() {
            return Err(LedgerError::MissingDescription);
        }
        validation::validate_currency(&input.currency_code)?;
        if !period.contains_date(input.entry_date) {
            return Err(LedgerError::EntryDateOutsidePeriod {
                date: input.entry_date,
                start: period.start_date,
                end: period.end_date,
            });
        }
        Ok(())
    }

    fn validate_accounts<A>(
        lines: &[JournalLineInput],
        organization_id: OrganizationId,
        account_lookup: &A,
    ) -> Result<(), LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        for line in lines {
            let account = account_lookup(line.account_id)
                .filter(|a| a.organization_id == organization_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if !account.allow_posting {
                return Err(LedgerError::AccountNotPostable(line.account_id));
            }
        }
        Ok(())
    }

    /// Validates toggling `allow_posting` on an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountHasChildren` when enabling posting on an account that has
    /// child accounts.
    pub fn validate_allow_posting_change(
        account: &AccountInfo,
        allow_posting: bool,
        child_count: u64,
    ) -> Result<(), LedgerError> {
        if allow_posting && child_count > 0 {
            return Err(LedgerError::AccountHasChildren(account.id));
        }
        Ok(())
    }

    /// Validates that an entry can go through the draft-posting path.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` for posted or reversed entries.
    pub fn ensure_draft(id: JournalEntryId, status: JournalStatus) -> Result<(), LedgerError> {
        match status {
            JournalStatus::Draft => Ok(()),
            JournalStatus::Posted | JournalStatus::Reversed => Err(LedgerError::NotDraft(id)),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
