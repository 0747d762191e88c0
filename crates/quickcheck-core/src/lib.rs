//! Core types, storage abstraction and business rules for the QuickCheck
//! visitor ledger.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::LedgerStore`]; front ends drive [`ledger::VisitLedger`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dashboard;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod model;
pub mod notify;
pub mod report;
pub mod store;
pub mod view;

pub use error::{Error, Result};
pub use ledger::{LedgerConfig, VisitLedger};
pub use memory::MemoryStore;
