//! Per-token read failures.
//!
//! A failure is attached to the one token it concerns; it never aborts a
//! batch. Presentation layers render any of these as an explicit
//! "unavailable" placeholder rather than a default state.

use daypart_core::TokenId;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ReadFailure {
  /// The ledger has no owner for this id.
  #[error("token {0} does not exist")]
  NotFound(TokenId),

  /// Transient failures (or timeouts) outlasted the retry budget.
  #[error("ledger unavailable after {attempts} attempts: {source}")]
  Unavailable {
    attempts: u32,
    #[source]
    source:   BoxError,
  },

  /// The ledger rejected the read permanently.
  #[error("ledger error: {0}")]
  Ledger(#[source] BoxError),

  /// The ledger answered, but its descriptor does not decode.
  #[error("descriptor error: {0}")]
  Decode(#[from] daypart_metadata::Error),

  /// The read task ended without reporting a result.
  #[error("read did not complete")]
  Cancelled,
}

impl ReadFailure {
  /// Whether trying again later might succeed.
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::Unavailable { .. } | Self::Cancelled)
  }
}
