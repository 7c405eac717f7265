//! SQLite backend for the Balcão order ledger.
//!
//! Wraps [`tokio_rusqlite`] so the single connection to the database file
//! lives on one dedicated thread. Every statement is funnelled through that
//! thread, which makes this the single writer of the file.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
