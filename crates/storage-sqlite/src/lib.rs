//! SQLite storage implementation for the fintrack goal engine.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `fintrack-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The goal repository implementation
//! - Database-specific model types (with Diesel derives)
//!
//! This crate is the only place in the system where Diesel dependencies
//! exist. `fintrack-core` is database-agnostic and works with traits.

pub mod db;
pub mod errors;
pub mod goals;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from fintrack-core for convenience
pub use fintrack_core::errors::{DatabaseError, Error, Result};
