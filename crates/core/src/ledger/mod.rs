//! Double-entry bookkeeping logic.
//!
//! This module implements the journal side of the ledger:
//! - Domain types (accounts, books, journal entries, line amounts)
//! - Structural line validation and balancing
//! - Ledger service for posting and draft validation
//! - Reversal generation
//! - Per-period account activity

pub mod balance;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountActivity, PeriodActivity};
pub use error::LedgerError;
pub use reversal::{ReversalContext, ReversalService};
pub use service::{LedgerService, PostingContext};
pub use types::{
    AccountInfo, AccountType, BALANCE_TOLERANCE, Book, JournalEntry, JournalLine,
    JournalLineInput, JournalStatus, JournalTotals, LineAmount, PostJournalInput, Side,
    SourceType,
};
