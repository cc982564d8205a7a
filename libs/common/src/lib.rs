//! Common library for the BookMart application
//!
//! This crate provides shared infrastructure used by the BookMart services:
//! PostgreSQL connection pooling, database configuration from the
//! environment, migrations, and the database error types.

pub mod database;
pub mod error;
