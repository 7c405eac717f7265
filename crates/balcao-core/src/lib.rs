//! Core types and pure logic for the Balcão order ledger.
//!
//! This crate is deliberately free of database dependencies. Line-item
//! reconciliation, financial totals, delivery dates and status filtering are
//! all derived here from typed records; storage backends only persist them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod client;
pub mod error;
pub mod expense;
pub mod extensions;
pub mod money;
pub mod order;
pub mod projector;
pub mod reconcile;
pub mod schedule;
pub mod status;
pub mod store;

pub use error::{Error, Result};
