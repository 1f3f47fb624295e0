//! Token identity and the ledger's per-token record.

use std::{fmt, num::NonZeroU64, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, offset::TimezoneOffset, time::TimePoint};

/// A token identifier. Ids are allocated densely from 1 by the ledger.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct TokenId(NonZeroU64);

impl TokenId {
  pub const FIRST: Self = Self(NonZeroU64::MIN);

  pub fn new(id: u64) -> Result<Self> {
    NonZeroU64::new(id).map(Self).ok_or(Error::InvalidTokenId)
  }

  pub fn get(self) -> u64 { self.0.get() }
}

impl fmt::Display for TokenId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

impl FromStr for TokenId {
  type Err = Error;

  /// Accepts `7` or `#7`.
  fn from_str(s: &str) -> Result<Self> {
    let digits = s.trim().trim_start_matches('#');
    digits
      .parse::<u64>()
      .map_err(|_| Error::InvalidTokenId)
      .and_then(Self::new)
  }
}

/// An account on the external ledger.
///
/// Normalised to trimmed ASCII lowercase on construction, so hex addresses
/// compare equal regardless of checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
  pub fn new(raw: impl AsRef<str>) -> Self {
    Self(raw.as_ref().trim().to_ascii_lowercase())
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl<'de> Deserialize<'de> for AccountId {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> std::result::Result<Self, D::Error> {
    String::deserialize(deserializer).map(Self::new)
  }
}

impl fmt::Display for AccountId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for AccountId {
  fn from(s: &str) -> Self { Self::new(s) }
}

/// A minted token as the ledger records it. Owner and offset are fixed at
/// mint time; nothing in Daypart mutates a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
  pub token_id:  TokenId,
  pub owner:     AccountId,
  pub offset:    TimezoneOffset,
  pub minted_at: TimePoint,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_ids_start_at_one() {
    assert_eq!(TokenId::new(0), Err(Error::InvalidTokenId));
    assert_eq!(TokenId::new(1), Ok(TokenId::FIRST));
    assert_eq!(TokenId::new(42).unwrap().to_string(), "#42");
  }

  #[test]
  fn token_id_parses_with_or_without_hash() {
    assert_eq!("7".parse::<TokenId>().unwrap().get(), 7);
    assert_eq!("#7".parse::<TokenId>().unwrap().get(), 7);
    assert!("0".parse::<TokenId>().is_err());
    assert!("-1".parse::<TokenId>().is_err());
  }

  #[test]
  fn account_ids_ignore_case() {
    let a = AccountId::new("0xAbCd");
    let b = AccountId::new(" 0xabcd ");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "0xabcd");

    let c: AccountId = serde_json::from_str("\"0xABCD\"").unwrap();
    assert_eq!(c, a);
  }
}
