//! Error types for `daypart-core`.

use thiserror::Error;

use crate::token::TokenId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("timezone offset {0} minutes is outside [-720, 840]")]
  OffsetOutOfRange(i64),

  #[error(
    "timezone offset {minutes} minutes is not a multiple of {granularity} \
     minutes"
  )]
  OffsetMisaligned { minutes: i64, granularity: u16 },

  #[error("timezone offset {0:?} is not a whole number of minutes")]
  OffsetNotWholeMinutes(String),

  #[error("offset granularity must divide 15 minutes, got {0}")]
  InvalidGranularity(u16),

  #[error("unknown time state discriminant: {0}")]
  UnknownState(u8),

  #[error("token ids start at 1")]
  InvalidTokenId,

  #[error("token not found: {0}")]
  TokenNotFound(TokenId),

  #[error("insufficient payment: required {required}, offered {offered}")]
  InsufficientPayment { required: u128, offered: u128 },

  #[error("supply cap of {cap} tokens reached")]
  SupplyExhausted { cap: u64 },
}

impl Error {
  /// Whether this error rejects a caller-supplied offset.
  pub fn is_invalid_offset(&self) -> bool {
    matches!(
      self,
      Self::OffsetOutOfRange(_)
        | Self::OffsetMisaligned { .. }
        | Self::OffsetNotWholeMinutes(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
