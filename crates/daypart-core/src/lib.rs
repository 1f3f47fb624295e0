//! Core types for Daypart: tokens whose appearance follows the time of day in
//! a fixed, per-token timezone offset.
//!
//! This crate holds the offset validator, the time-state classifier and the
//! ledger traits. It is deliberately free of database, HTTP and encoding
//! dependencies; every other crate in the workspace depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ledger;
pub mod offset;
pub mod time;
pub mod token;

pub use error::{Error, Result};
pub use offset::{OffsetPolicy, TimezoneOffset};
pub use time::{
  Clock, DetailedTimeInfo, FixedClock, LocalTimeBreakdown, SystemClock,
  TimePoint, TimeState, classify,
};
pub use token::{AccountId, TokenId, TokenRecord};
