//! Core business logic for Closebook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Journal validation, reversal and period activity
//! - `period` - Fiscal periods and the per-book status state machine
//! - `close` - Close run decisions and close journal generation

pub mod close;
pub mod ledger;
pub mod period;

