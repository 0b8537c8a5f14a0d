//! Fintrack Core - Goal auto-tracking domain entities, services, and traits.
//!
//! This crate contains the goal matching, progress tracking, and analytics
//! logic. It is database-agnostic and defines repository traits that are
//! implemented by the `storage-sqlite` crate.

pub mod ai;
pub mod analytics;
pub mod constants;
pub mod errors;
pub mod goals;
pub mod matching;
pub mod tracking;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
