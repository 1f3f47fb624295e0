//! The ledger traits: the read-only capability the rest of Daypart consumes,
//! plus the single write operation, `mint`.
//!
//! Supply, balances and ownership belong to the ledger. Higher layers
//! (`daypart-inventory`, `daypart-cli`) depend on these abstractions and
//! never on a concrete backend, so tests can swap in a fake.

use std::future::Future;

use crate::{
  offset::TimezoneOffset,
  time::{DetailedTimeInfo, TimeState},
  token::{AccountId, TokenId, TokenRecord},
};

/// Classifies a ledger failure as retryable or permanent.
pub trait Transient {
  /// `true` when the same read may succeed if tried again later (connection
  /// dropped, store busy). Permanent failures return `false`.
  fn is_transient(&self) -> bool;
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Read-only view of a token ledger.
///
/// Per-token reads return `Ok(None)` when the id has no owner. Every method
/// returns a `Send` future so the trait can be fanned out across a
/// multi-threaded tokio runtime.
pub trait LedgerReader: Send + Sync {
  type Error: std::error::Error + Transient + Send + Sync + 'static;

  /// Number of tokens minted so far. Ids `1..=total_supply` all exist.
  fn total_supply(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of tokens held by `account`.
  fn balance_of<'a>(
    &'a self,
    account: &'a AccountId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// The full record for `id`.
  fn token(
    &self,
    id: TokenId,
  ) -> impl Future<Output = Result<Option<TokenRecord>, Self::Error>> + Send + '_;

  fn owner_of(
    &self,
    id: TokenId,
  ) -> impl Future<Output = Result<Option<AccountId>, Self::Error>> + Send + '_;

  fn timezone_offset_of(
    &self,
    id: TokenId,
  ) -> impl Future<Output = Result<Option<TimezoneOffset>, Self::Error>>
  + Send
  + '_;

  /// The encoded metadata descriptor for `id`, rendered at the ledger's
  /// current time.
  fn descriptor_of(
    &self,
    id: TokenId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// The state of `id` at the ledger's current time.
  fn current_state(
    &self,
    id: TokenId,
  ) -> impl Future<Output = Result<Option<TimeState>, Self::Error>> + Send + '_;

  /// The full time breakdown of `id` at the ledger's current time.
  fn detailed_time_info(
    &self,
    id: TokenId,
  ) -> impl Future<Output = Result<Option<DetailedTimeInfo>, Self::Error>>
  + Send
  + '_;
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// A ledger that accepts mints.
pub trait LedgerWriter: LedgerReader {
  /// Mint the next token to `to` with a fixed `offset_minutes`.
  ///
  /// Rejected with [`crate::Error::InsufficientPayment`], an invalid-offset
  /// error, or [`crate::Error::SupplyExhausted`] (surfaced through
  /// `Self::Error`). The new id is always `total_supply + 1`.
  fn mint(
    &self,
    to: AccountId,
    offset_minutes: i64,
    payment: u128,
  ) -> impl Future<Output = Result<TokenRecord, Self::Error>> + Send + '_;
}
