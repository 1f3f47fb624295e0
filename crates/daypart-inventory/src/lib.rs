//! Collection inventory for Daypart.
//!
//! Enumerates live token ids and reads many tokens in parallel through any
//! [`LedgerReader`], isolating failures per token. [`RefreshSession`] wraps
//! that in a re-entrant refresh where the newest request always wins.

pub mod error;
mod policy;
mod read;
mod session;

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use daypart_core::{
  LocalTimeBreakdown, TimePoint, TokenId, TokenRecord, ledger::LedgerReader,
};
use daypart_metadata::MetadataDescriptor;
use tokio::{sync::Semaphore, task::JoinSet};

pub use error::ReadFailure;
pub use policy::RefreshPolicy;
pub use session::{RefreshResult, RefreshSession, RefreshTicket};

/// Per-token outcome of a batch read.
pub type Entries = BTreeMap<TokenId, Result<TokenView, ReadFailure>>;

/// Ids `1..=total_supply`. Allocation is dense, so this is every live token.
pub fn list_live_ids(total_supply: u64) -> Vec<TokenId> {
  (1..=total_supply).filter_map(|n| TokenId::new(n).ok()).collect()
}

// ─── TokenView ───────────────────────────────────────────────────────────────

/// A token as the inventory sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenView {
  pub record:    TokenRecord,
  /// Classification recomputed locally at the batch's `as_of`.
  pub breakdown: LocalTimeBreakdown,
  /// The ledger's descriptor, decoded.
  pub metadata:  MetadataDescriptor,
}

impl TokenView {
  pub fn token_id(&self) -> TokenId { self.record.token_id }

  /// Whether the descriptor names the same state as the local classification.
  /// False when the ledger rendered it across a state boundary from `as_of`.
  pub fn in_sync(&self) -> bool {
    self.metadata.state() == Some(self.breakdown.state)
  }
}

// ─── Inventory ───────────────────────────────────────────────────────────────

/// Parallel reader over a shared ledger.
pub struct Inventory<L> {
  ledger: Arc<L>,
  policy: RefreshPolicy,
}

impl<L: LedgerReader + 'static> Inventory<L> {
  pub fn new(ledger: Arc<L>, policy: RefreshPolicy) -> Self {
    Self { ledger, policy }
  }

  pub fn ledger(&self) -> &Arc<L> { &self.ledger }

  pub fn policy(&self) -> &RefreshPolicy { &self.policy }

  /// Every live id, from the ledger's current supply.
  pub async fn live_ids(&self) -> Result<Vec<TokenId>, ReadFailure> {
    let supply =
      read::with_retry(&self.policy, "total_supply", || self.ledger.total_supply())
        .await?;
    Ok(list_live_ids(supply))
  }

  /// Read every id in `ids`, classifying each at `as_of`.
  ///
  /// Reads run concurrently, at most `max_concurrent_reads` at a time. The
  /// result has exactly one entry per distinct id; a failing id never
  /// affects its siblings.
  pub async fn refresh_many(&self, ids: &[TokenId], as_of: TimePoint) -> Entries {
    let ids: BTreeSet<TokenId> = ids.iter().copied().collect();
    let permits = Arc::new(Semaphore::new(self.policy.max_concurrent_reads.max(1)));
    let mut reads = JoinSet::new();

    for &id in &ids {
      let ledger = Arc::clone(&self.ledger);
      let policy = self.policy.clone();
      let permits = Arc::clone(&permits);
      reads.spawn(async move {
        // The semaphore is never closed, so this is always `Ok`; the permit
        // is held until the read finishes.
        let _permit = permits.acquire_owned().await;
        (id, read::read_token(&*ledger, id, as_of, &policy).await)
      });
    }

    let mut entries = Entries::new();
    while let Some(joined) = reads.join_next().await {
      match joined {
        Ok((id, result)) => {
          if let Err(ReadFailure::NotFound(_)) = &result {
            tracing::warn!(%id, "live id has no token; allocation is not dense");
          }
          entries.insert(id, result);
        }
        Err(e) => tracing::warn!(error = %e, "token read task failed"),
      }
    }
    for id in ids {
      entries.entry(id).or_insert(Err(ReadFailure::Cancelled));
    }
    entries
  }
}
