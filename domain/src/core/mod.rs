//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — prompt-budget string helpers

pub mod error;
pub mod string;
