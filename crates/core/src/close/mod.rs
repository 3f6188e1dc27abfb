//! Period close and reopen.
//!
//! This module holds the pure parts of the close workflow:
//! - Close run records and request/outcome types
//! - Idempotency decision and reopen target selection
//! - Year-end closing and carry-forward journal generation
//!
//! Persistence and transaction handling live in the db crate.

pub mod error;
pub mod generator;
pub mod planner;
pub mod types;

#[cfg(test)]
mod generator_props;

pub use error::CloseError;
pub use generator::CloseJournalGenerator;
pub use planner::{CloseDecision, ClosePlanner};
pub use types::{
    CloseJournals, CloseOutcome, CloseRun, CloseRunRequest, CloseRunStatus, ReopenOutcome,
    ReopenRequest,
};
