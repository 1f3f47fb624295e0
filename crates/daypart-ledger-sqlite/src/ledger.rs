//! [`SqliteLedger`]: the SQLite implementation of [`LedgerReader`] and
//! [`LedgerWriter`].

use std::{path::Path, sync::Arc};

use daypart_core::{
  AccountId, Clock, DetailedTimeInfo, LocalTimeBreakdown, OffsetPolicy,
  SystemClock, TimePoint, TimeState, TimezoneOffset, TokenId, TokenRecord,
  classify,
  ledger::{LedgerReader, LedgerWriter},
};
use rusqlite::OptionalExtension as _;

use crate::{
  encode::{RawToken, encode_time, encode_token_id},
  schema::SCHEMA,
  Error, Result,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Mint rules enforced by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
  /// Price of one mint, in the smallest currency unit (wei).
  pub mint_price:         u128,
  /// Hard cap on the number of tokens.
  pub max_supply:         u64,
  /// Alignment every minted offset must satisfy.
  pub offset_granularity: OffsetPolicy,
}

impl Default for LedgerConfig {
  fn default() -> Self {
    Self {
      // 0.01 ETH.
      mint_price:         10_000_000_000_000_000,
      max_supply:         1000,
      offset_granularity: OffsetPolicy::default(),
    }
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A Daypart ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteLedger {
  pub(crate) conn: tokio_rusqlite::Connection,
  config: LedgerConfig,
  clock:  Arc<dyn Clock>,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, config: LedgerConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, config).await
  }

  /// Open an in-memory ledger, for tests.
  pub async fn open_in_memory(config: LedgerConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, config).await
  }

  /// Replace the clock used for mint timestamps and time-dependent reads.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn config(&self) -> &LedgerConfig { &self.config }

  async fn init(conn: tokio_rusqlite::Connection, config: LedgerConfig) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, config, clock: Arc::new(SystemClock) })
  }

  /// Classify `id` at the ledger's current time.
  async fn breakdown_now(
    &self,
    id: TokenId,
  ) -> Result<Option<(TimePoint, LocalTimeBreakdown)>> {
    let now = self.clock.now();
    Ok(
      self
        .timezone_offset_of(id)
        .await?
        .map(|offset| (now, classify(now, offset))),
    )
  }

  async fn count(&self, owner: Option<String>) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        let n = match owner {
          Some(owner) => conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE owner = ?1",
            rusqlite::params![owner],
            |r| r.get(0),
          )?,
          None => conn.query_row("SELECT COUNT(*) FROM tokens", [], |r| r.get(0))?,
        };
        Ok(n)
      })
      .await?;
    u64::try_from(n).map_err(|_| Error::Corrupt(format!("negative count {n}")))
  }
}

// ─── LedgerReader impl ───────────────────────────────────────────────────────

impl LedgerReader for SqliteLedger {
  type Error = Error;

  async fn total_supply(&self) -> Result<u64> { self.count(None).await }

  async fn balance_of(&self, account: &AccountId) -> Result<u64> {
    self.count(Some(account.as_str().to_owned())).await
  }

  async fn token(&self, id: TokenId) -> Result<Option<TokenRecord>> {
    let id = encode_token_id(id);

    let raw: Option<RawToken> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM tokens WHERE token_id = ?1", RawToken::COLUMNS),
              rusqlite::params![id],
              RawToken::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawToken::into_record).transpose()
  }

  async fn owner_of(&self, id: TokenId) -> Result<Option<AccountId>> {
    Ok(self.token(id).await?.map(|t| t.owner))
  }

  async fn timezone_offset_of(&self, id: TokenId) -> Result<Option<TimezoneOffset>> {
    Ok(self.token(id).await?.map(|t| t.offset))
  }

  async fn descriptor_of(&self, id: TokenId) -> Result<Option<String>> {
    let Some((_, breakdown)) = self.breakdown_now(id).await? else {
      return Ok(None);
    };
    Ok(Some(daypart_metadata::render(id, &breakdown)?))
  }

  async fn current_state(&self, id: TokenId) -> Result<Option<TimeState>> {
    Ok(self.breakdown_now(id).await?.map(|(_, b)| b.state))
  }

  async fn detailed_time_info(&self, id: TokenId) -> Result<Option<DetailedTimeInfo>> {
    Ok(
      self
        .breakdown_now(id)
        .await?
        .map(|(now, b)| DetailedTimeInfo::new(now, b)),
    )
  }
}

// ─── LedgerWriter impl ───────────────────────────────────────────────────────

impl LedgerWriter for SqliteLedger {
  async fn mint(
    &self,
    to: AccountId,
    offset_minutes: i64,
    payment: u128,
  ) -> Result<TokenRecord> {
    let required = self.config.mint_price;
    if payment < required {
      return Err(
        daypart_core::Error::InsufficientPayment { required, offered: payment }
          .into(),
      );
    }
    let offset = self.config.offset_granularity.validate(offset_minutes)?;

    let cap       = self.config.max_supply;
    let minted_at = self.clock.now();
    let owner     = to.as_str().to_owned();
    let at        = encode_time(minted_at);
    let minutes   = i64::from(offset.minutes());

    // Cap check and id allocation share one write transaction, so concurrent
    // mints can never skip or reuse an id.
    let allocated: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn
          .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let supply: i64 =
          tx.query_row("SELECT COUNT(*) FROM tokens", [], |r| r.get(0))?;
        if u64::try_from(supply).map_or(true, |s| s >= cap) {
          return Ok(None);
        }
        let id = supply + 1;
        tx.execute(
          "INSERT INTO tokens (token_id, owner, offset_minutes, minted_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id, owner, minutes, at],
        )?;
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    let Some(id) = allocated else {
      tracing::warn!(cap, "mint rejected: supply exhausted");
      return Err(daypart_core::Error::SupplyExhausted { cap }.into());
    };
    let token_id = u64::try_from(id)
      .ok()
      .and_then(|id| TokenId::new(id).ok())
      .ok_or_else(|| Error::Corrupt(format!("allocated token id {id}")))?;

    tracing::info!(%token_id, owner = %to, %offset, "minted token");

    Ok(TokenRecord { token_id, owner: to, offset, minted_at })
  }
}
