//! One token read: fetch with timeout and retry, then decode.

use std::future::Future;

use daypart_core::{
  TimePoint, TokenId, TokenRecord, classify,
  ledger::{LedgerReader, Transient},
};

use crate::{ReadFailure, RefreshPolicy, TokenView};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run `op` until it succeeds, fails permanently, or the policy's attempt
/// budget is spent. Each attempt gets its own deadline.
pub(crate) async fn with_retry<T, E, F, Fut>(
  policy: &RefreshPolicy,
  what: &str,
  mut op: F,
) -> Result<T, ReadFailure>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: std::error::Error + Transient + Send + Sync + 'static,
{
  let attempts = policy.attempts();
  let mut attempt = 0;
  loop {
    attempt += 1;
    tracing::debug!(what, attempt, "ledger read");

    let source: BoxError =
      match tokio::time::timeout(policy.read_timeout(), op()).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) if !e.is_transient() => {
          return Err(ReadFailure::Ledger(Box::new(e)));
        }
        Ok(Err(e)) => Box::new(e),
        Err(elapsed) => Box::new(elapsed),
      };

    if attempt >= attempts {
      return Err(ReadFailure::Unavailable { attempts: attempt, source });
    }
    let delay = policy.backoff(attempt);
    tracing::warn!(what, attempt, ?delay, error = %source, "ledger read failed, retrying");
    tokio::time::sleep(delay).await;
  }
}

async fn fetch<L: LedgerReader>(
  ledger: &L,
  id: TokenId,
) -> Result<Option<(TokenRecord, String)>, L::Error> {
  let Some(record) = ledger.token(id).await? else { return Ok(None) };
  let Some(descriptor) = ledger.descriptor_of(id).await? else {
    return Ok(None);
  };
  Ok(Some((record, descriptor)))
}

/// Read `id` and build its view as of `as_of`.
pub(crate) async fn read_token<L: LedgerReader>(
  ledger: &L,
  id: TokenId,
  as_of: TimePoint,
  policy: &RefreshPolicy,
) -> Result<TokenView, ReadFailure> {
  let what = id.to_string();
  let (record, descriptor) = with_retry(policy, &what, || fetch(ledger, id))
    .await?
    .ok_or(ReadFailure::NotFound(id))?;

  let view = TokenView {
    breakdown: classify(as_of, record.offset),
    metadata:  daypart_metadata::decode(&descriptor)?,
    record,
  };
  if !view.in_sync() {
    tracing::warn!(
      %id,
      computed = %view.breakdown.state,
      described = ?view.metadata.state(),
      "descriptor state differs from local classification"
    );
  }
  Ok(view)
}
