//! Conversions between domain types and SQLite column values.
//!
//! Ids, offsets and timestamps are all stored as INTEGER.

use daypart_core::{AccountId, TimePoint, TimezoneOffset, TokenId, TokenRecord};

use crate::{Error, Result};

/// Ids beyond `i64::MAX` cannot exist in the table; they saturate so a
/// lookup simply finds nothing.
pub fn encode_token_id(id: TokenId) -> i64 {
  i64::try_from(id.get()).unwrap_or(i64::MAX)
}

pub fn encode_time(t: TimePoint) -> i64 {
  i64::try_from(t.as_secs()).unwrap_or(i64::MAX)
}

/// A `tokens` row as read from SQLite, before validation.
pub struct RawToken {
  pub token_id:       i64,
  pub owner:          String,
  pub offset_minutes: i64,
  pub minted_at:      i64,
}

impl RawToken {
  pub const COLUMNS: &'static str = "token_id, owner, offset_minutes, minted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      token_id:       row.get(0)?,
      owner:          row.get(1)?,
      offset_minutes: row.get(2)?,
      minted_at:      row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<TokenRecord> {
    let token_id = u64::try_from(self.token_id)
      .ok()
      .and_then(|id| TokenId::new(id).ok())
      .ok_or_else(|| Error::Corrupt(format!("token id {}", self.token_id)))?;
    let offset = TimezoneOffset::new(self.offset_minutes).map_err(|e| {
      Error::Corrupt(format!("offset of token {token_id}: {e}"))
    })?;
    let minted_at = u64::try_from(self.minted_at).map_err(|_| {
      Error::Corrupt(format!("mint time of token {token_id}: {}", self.minted_at))
    })?;

    Ok(TokenRecord {
      token_id,
      owner: AccountId::new(self.owner),
      offset,
      minted_at: TimePoint(minted_at),
    })
  }
}
