//! Shared types, errors, and configuration for Closebook.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The error taxonomy shared by every module error
//! - Configuration management
//! - Tenant context carried by bearer tokens

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::ErrorCategory;
pub use jwt::{JwtError, JwtService};
