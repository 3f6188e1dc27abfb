//! Reversal of posted journal entries.
//!
//! Posted entries are never edited. A reversal is a new entry whose lines
//! mirror the original's: same account, same amounts, same order, debit and
//! credit swapped.

use chrono::NaiveDate;
use closebook_shared::types::{FiscalPeriodId, UserId};

use super::error::LedgerError;
use super::types::{
    JournalEntry, JournalLine, JournalLineInput, JournalStatus, PostJournalInput, SourceType,
};
use crate::period::PostingPrivilege;

/// Where and by whom a reversal is posted.
#[derive(Debug, Clone)]
pub struct ReversalContext {
    /// Period the reversal is posted into.
    pub fiscal_period_id: FiscalPeriodId,
    /// Accounting date of the reversal.
    pub entry_date: NaiveDate,
    /// Overrides the default "Reversal of ..." description.
    pub description: Option<String>,
    /// Acting principal.
    pub created_by: UserId,
}

/// Stateless service for creating reversal entries.
pub struct ReversalService;

impl ReversalService {
    /// Checks that `original` may be reversed.
    ///
    /// # Errors
    ///
    /// `NotReversible` unless the entry is POSTED; `ReversalOfReversal` if the
    /// entry is itself a reversal; `GeneratedJournal` if a close run generated
    /// it and the caller is not the close workflow.
    pub fn ensure_reversible(
        original: &JournalEntry,
        privilege: PostingPrivilege,
    ) -> Result<(), LedgerError> {
        if original.source_type == SourceType::Reversal || original.reverses_entry_id.is_some() {
            return Err(LedgerError::ReversalOfReversal(original.id));
        }
        // close journals are only undone by reopening their period
        if original.source_type.is_system_generated() && privilege == PostingPrivilege::Standard {
            return Err(LedgerError::GeneratedJournal(original.id));
        }
        if original.status != JournalStatus::Posted {
            return Err(LedgerError::NotReversible {
                id: original.id,
                status: original.status,
            });
        }
        Ok(())
    }

    /// Mirrors lines by swapping base debit and credit. Line order is preserved.
    #[must_use]
    pub fn mirror_lines(lines: &[JournalLine]) -> Vec<JournalLineInput> {
        let mut ordered: Vec<&JournalLine> = lines.iter().collect();
        ordered.sort_by_key(|l| l.line_no);

        ordered
            .into_iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                amount: line.amount.mirrored(),
                description: line.description.clone(),
            })
            .collect()
    }

    /// Builds the posting input for the reversal of `original`.
    ///
    /// # Errors
    ///
    /// See [`ReversalService::ensure_reversible`].
    pub fn build(
        original: &JournalEntry,
        ctx: &ReversalContext,
        privilege: PostingPrivilege,
    ) -> Result<PostJournalInput, LedgerError> {
        Self::ensure_reversible(original, privilege)?;

        Ok(PostJournalInput {
            organization_id: original.organization_id,
            book_id: original.book_id,
            fiscal_period_id: ctx.fiscal_period_id,
            entry_date: ctx.entry_date,
            document_date: ctx.entry_date,
            currency_code: original.currency_code.clone(),
            source_type: SourceType::Reversal,
            description: ctx
                .description
                .clone()
                .unwrap_or_else(|| format!("Reversal of {}", original.description)),
            lines: Self::mirror_lines(&original.lines),
            created_by: ctx.created_by,
        })
    }
}
