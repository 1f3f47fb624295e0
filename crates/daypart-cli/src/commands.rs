//! Subcommand implementations. Output goes to stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use daypart_core::{
  AccountId, Clock as _, LocalTimeBreakdown, SystemClock, TimePoint,
  TimezoneOffset, TokenId,
  ledger::{LedgerReader as _, LedgerWriter as _},
};
use daypart_inventory::{
  Inventory, ReadFailure, RefreshPolicy, RefreshSession, TokenView,
};
use daypart_ledger_sqlite::SqliteLedger;

use crate::settings::CliConfig;

// ─── mint ─────────────────────────────────────────────────────────────────────

pub async fn mint(
  ledger: &SqliteLedger,
  cfg: &CliConfig,
  owner: &str,
  offset: &str,
  payment: Option<u128>,
) -> Result<()> {
  let offset = cfg
    .offset_granularity
    .parse(offset)
    .with_context(|| format!("invalid offset {offset:?}"))?;
  let payment = payment.unwrap_or(ledger.config().mint_price);

  let record = ledger
    .mint(AccountId::new(owner), i64::from(offset.minutes()), payment)
    .await
    .context("mint failed")?;

  println!("minted {} to {} at {}", record.token_id, record.owner, record.offset);
  Ok(())
}

// ─── list ─────────────────────────────────────────────────────────────────────

pub async fn list(
  ledger: SqliteLedger,
  policy: RefreshPolicy,
  at: Option<TimePoint>,
) -> Result<()> {
  let inventory = Arc::new(Inventory::new(Arc::new(ledger), policy));
  let ids = inventory
    .live_ids()
    .await
    .context("failed to read total supply")?;
  if ids.is_empty() {
    println!("no tokens minted");
    return Ok(());
  }

  let as_of = at.unwrap_or_else(|| SystemClock.now());
  let session = RefreshSession::new(inventory);
  if !session.refresh(ids, as_of).applied().await {
    bail!("refresh did not complete");
  }
  let result = session.latest().context("refresh produced no result")?;

  println!("{}", header());
  for (id, entry) in &result.entries {
    println!("{}", row(*id, entry));
  }
  Ok(())
}

fn header() -> String {
  format!("{:<6} {:<44} {:<10} {:<6} STATE", "TOKEN", "OWNER", "OFFSET", "LOCAL")
}

/// One table row. Failed reads are shown as unavailable, never as a state.
fn row(id: TokenId, entry: &Result<TokenView, ReadFailure>) -> String {
  match entry {
    Ok(view) => format!(
      "{:<6} {:<44} {:<10} {:<6} {}{}",
      id.to_string(),
      view.record.owner.to_string(),
      view.record.offset.to_string(),
      view.breakdown.local_time(),
      view.breakdown.state,
      if view.in_sync() { "" } else { " (descriptor stale)" },
    ),
    Err(e) => format!("{:<6} unavailable: {e}", id.to_string()),
  }
}

// ─── show ─────────────────────────────────────────────────────────────────────

pub async fn show(ledger: &SqliteLedger, id: TokenId, svg: bool) -> Result<()> {
  let record = ledger
    .token(id)
    .await?
    .with_context(|| format!("token {id} does not exist"))?;
  let descriptor = ledger
    .descriptor_of(id)
    .await?
    .with_context(|| format!("token {id} has no descriptor"))?;
  let meta = daypart_metadata::decode(&descriptor)
    .context("ledger returned an undecodable descriptor")?;

  if svg {
    println!("{}", daypart_metadata::image::decode_data_uri(&meta.image)?);
    return Ok(());
  }

  let info = ledger
    .detailed_time_info(id)
    .await?
    .with_context(|| format!("token {id} has no time info"))?;

  println!("{}", meta.name);
  println!("{}", meta.description);
  println!();
  println!("  {:<12} {}", "Owner", record.owner);
  println!("  {:<12} {}", "Minted", record.minted_at);
  println!("  {:<12} {}", "As of", info.timestamp);
  for attr in &meta.attributes {
    println!("  {:<12} {}", attr.trait_type, attr.value);
  }
  Ok(())
}

// ─── classify ─────────────────────────────────────────────────────────────────

pub fn classify(offset: &str, at: Option<TimePoint>) -> Result<()> {
  let offset: TimezoneOffset = offset
    .parse()
    .with_context(|| format!("invalid offset {offset:?}"))?;
  let at = at.unwrap_or_else(|| SystemClock.now());
  println!("{}", classification(at, &daypart_core::classify(at, offset)));
  Ok(())
}

fn classification(at: TimePoint, b: &LocalTimeBreakdown) -> String {
  let (start, end) = b.state.window();
  format!(
    "{at}: {} UTC is {} in {}, {} from {start:02}:00 to {end:02}:00",
    b.utc_time(),
    b.local_time(),
    b.offset,
    b.state,
  )
}

// ─── decode ───────────────────────────────────────────────────────────────────

pub fn decode(descriptor: &str) -> Result<()> {
  let meta = match daypart_metadata::decode(descriptor.trim()) {
    Ok(meta) => meta,
    Err(e) => {
      let hint = decode_hint(&e);
      return Err(anyhow::Error::new(e).context(hint));
    }
  };

  println!("{}", meta.name);
  println!("{}", meta.description);
  for attr in &meta.attributes {
    println!("  {:<12} {}", attr.trait_type, attr.value);
  }
  match meta.state() {
    Some(state) => println!("  {:<12} {state}", "State"),
    None => println!("  {:<12} unknown", "State"),
  }
  Ok(())
}

/// What went wrong, phrased for someone pasting a URI.
fn decode_hint(e: &daypart_metadata::Error) -> &'static str {
  use daypart_metadata::Error;
  match e {
    Error::BadPrefix { .. } => {
      "not a descriptor: expected a data:application/json;base64, URI"
    }
    Error::BadBase64(_) => "descriptor payload is not valid base64",
    Error::MalformedJson(_) => "descriptor payload is not metadata JSON",
    Error::ImageNotUtf8(_) | Error::Encode(_) => "descriptor could not be processed",
  }
}

#[cfg(test)]
mod tests {
  use daypart_core::{TimezoneOffset, TokenRecord};

  use super::*;

  /// 2024-06-01T00:00:00Z
  const MIDNIGHT: u64 = 1_717_200_000;

  fn view(offset: i64, descriptor_at: u64, as_of: u64) -> TokenView {
    let offset = TimezoneOffset::new(offset).unwrap();
    let rendered_at = daypart_core::classify(TimePoint(descriptor_at), offset);
    let descriptor = daypart_metadata::render(TokenId::FIRST, &rendered_at).unwrap();
    TokenView {
      record:    TokenRecord {
        token_id:  TokenId::FIRST,
        owner:     AccountId::new("0xA11CE"),
        offset,
        minted_at: TimePoint(MIDNIGHT),
      },
      breakdown: daypart_core::classify(TimePoint(as_of), offset),
      metadata:  daypart_metadata::decode(&descriptor).unwrap(),
    }
  }

  #[test]
  fn row_shows_local_time_and_state() {
    let line = row(TokenId::FIRST, &Ok(view(330, MIDNIGHT, MIDNIGHT)));
    assert!(line.starts_with("#1 "));
    assert!(line.contains("0xa11ce"));
    assert!(line.contains("UTC+5:30"));
    assert!(line.contains("05:30"));
    assert!(line.ends_with("Night"));
  }

  #[test]
  fn row_flags_stale_descriptors() {
    let line = row(TokenId::FIRST, &Ok(view(0, MIDNIGHT + 12 * 3600, MIDNIGHT)));
    assert!(line.ends_with("Night (descriptor stale)"));
  }

  #[test]
  fn failed_row_is_unavailable_not_a_state() {
    let id = TokenId::new(4).unwrap();
    let line = row(id, &Err(ReadFailure::NotFound(id)));
    assert!(line.starts_with("#4 "));
    assert!(line.contains("unavailable"));
    for state in ["Night", "Morning", "Day"] {
      assert!(!line.contains(state), "{line}");
    }
  }

  #[test]
  fn classification_names_the_window() {
    let at = TimePoint(MIDNIGHT + 3 * 3600);
    let b = daypart_core::classify(at, TimezoneOffset::new(330).unwrap());
    assert_eq!(
      classification(at, &b),
      "2024-06-01T03:00:00Z: 03:00 UTC is 08:30 in UTC+5:30, Morning from 06:00 to 12:00"
    );
  }

  #[test]
  fn decode_errors_get_distinct_hints() {
    let hints: Vec<&str> = [
      "https://example.com/1.json",
      "data:application/json;base64,%%%",
      "data:application/json;base64,bm90IGpzb24=",
    ]
    .iter()
    .map(|uri| decode_hint(&daypart_metadata::decode(uri).unwrap_err()))
    .collect();

    assert_eq!(hints.len(), 3);
    assert_ne!(hints[0], hints[1]);
    assert_ne!(hints[1], hints[2]);
    assert_ne!(hints[0], hints[2]);
  }

  #[test]
  fn decode_command_reports_the_hint() {
    let err = decode("not a uri").unwrap_err();
    assert!(err.to_string().starts_with("not a descriptor"));
  }
}
