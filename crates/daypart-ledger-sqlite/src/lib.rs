//! SQLite-backed reference ledger for Daypart.
//!
//! Stands in for the external ledger: it owns supply, ownership, the mint
//! price and the supply cap, and renders descriptors through
//! [`daypart_metadata`] exactly as a remote ledger would. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod ledger;
mod schema;

pub mod error;

pub use error::{Error, Result};
pub use ledger::{LedgerConfig, SqliteLedger};
