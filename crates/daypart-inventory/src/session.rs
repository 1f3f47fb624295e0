//! Re-entrant refresh with supersede semantics.
//!
//! Every call to [`RefreshSession::refresh`] takes the next sequence number
//! and aborts the batch still in flight. A finished batch is applied only if
//! its sequence number is newer than the one currently published, so the
//! last request wins regardless of arrival order.

use std::sync::{
  Arc, Mutex, PoisonError,
  atomic::{AtomicBool, AtomicU64, Ordering},
};

use daypart_core::{TimePoint, TokenId, ledger::LedgerReader};
use tokio::{
  sync::watch,
  task::{AbortHandle, JoinHandle},
};

use crate::{Entries, Inventory, ReadFailure, TokenView};

// ─── RefreshResult ───────────────────────────────────────────────────────────

/// One completed batch.
#[derive(Debug)]
pub struct RefreshResult {
  pub seq:     u64,
  pub as_of:   TimePoint,
  pub entries: Entries,
}

impl RefreshResult {
  pub fn get(&self, id: TokenId) -> Option<&Result<TokenView, ReadFailure>> {
    self.entries.get(&id)
  }

  /// Tokens that read successfully, in id order.
  pub fn views(&self) -> impl Iterator<Item = &TokenView> {
    self.entries.values().filter_map(|r| r.as_ref().ok())
  }

  pub fn failures(&self) -> impl Iterator<Item = (TokenId, &ReadFailure)> {
    self
      .entries
      .iter()
      .filter_map(|(id, r)| r.as_ref().err().map(|e| (*id, e)))
  }
}

// ─── Shared state ────────────────────────────────────────────────────────────

type Latest = Option<Arc<RefreshResult>>;

struct Published {
  latest: watch::Sender<Latest>,
  closed: AtomicBool,
}

impl Published {
  /// Publish `result` unless the session is closed or something newer is
  /// already published. Runs under the channel's lock, so it is ordered
  /// against [`Published::close`] and concurrent applies.
  fn apply(&self, result: Arc<RefreshResult>) -> bool {
    self.latest.send_if_modified(|current| {
      if self.closed.load(Ordering::Acquire) {
        return false;
      }
      if current.as_ref().is_some_and(|c| c.seq >= result.seq) {
        return false;
      }
      *current = Some(result);
      true
    })
  }

  fn close(&self) {
    self.latest.send_if_modified(|_| {
      self.closed.store(true, Ordering::Release);
      false
    });
  }
}

// ─── RefreshSession ──────────────────────────────────────────────────────────

/// A long-lived refresh handle, typically one per view.
///
/// Must be used from within a tokio runtime. Dropping the session closes it.
pub struct RefreshSession<L> {
  inventory: Arc<Inventory<L>>,
  next_seq:  AtomicU64,
  published: Arc<Published>,
  in_flight: Mutex<Option<AbortHandle>>,
}

impl<L: LedgerReader + 'static> RefreshSession<L> {
  pub fn new(inventory: Arc<Inventory<L>>) -> Self {
    let (latest, _) = watch::channel(None);
    Self {
      inventory,
      next_seq: AtomicU64::new(1),
      published: Arc::new(Published { latest, closed: AtomicBool::new(false) }),
      in_flight: Mutex::new(None),
    }
  }

  /// Start a batch read of `ids` at `as_of`, superseding any batch in flight.
  pub fn refresh(&self, ids: Vec<TokenId>, as_of: TimePoint) -> RefreshTicket {
    // Held across spawn so sequence order matches abort order.
    let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
    let inventory = Arc::clone(&self.inventory);
    let published = Arc::clone(&self.published);

    let task = tokio::spawn(async move {
      let entries = inventory.refresh_many(&ids, as_of).await;
      let failed = entries.values().filter(|r| r.is_err()).count();
      let total = entries.len();
      let applied = published.apply(Arc::new(RefreshResult { seq, as_of, entries }));
      if applied {
        tracing::info!(seq, total, failed, "refresh applied");
      } else {
        tracing::debug!(seq, "refresh superseded, result discarded");
      }
      applied
    });

    if let Some(previous) = in_flight.replace(task.abort_handle()) {
      previous.abort();
    }
    drop(in_flight);

    RefreshTicket { seq, task }
  }

  /// The most recently applied batch.
  pub fn latest(&self) -> Option<Arc<RefreshResult>> {
    self.published.latest.borrow().clone()
  }

  /// Receive every applied batch.
  pub fn subscribe(&self) -> watch::Receiver<Option<Arc<RefreshResult>>> {
    self.published.latest.subscribe()
  }

  pub fn is_closed(&self) -> bool {
    self.published.closed.load(Ordering::Acquire)
  }
}

impl<L> RefreshSession<L> {
  /// Abort the batch in flight and stop applying results. Idempotent.
  pub fn close(&self) {
    self.published.close();
    let in_flight = self
      .in_flight
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(task) = in_flight {
      task.abort();
    }
  }
}

impl<L> Drop for RefreshSession<L> {
  fn drop(&mut self) { self.close(); }
}

// ─── RefreshTicket ───────────────────────────────────────────────────────────

/// Handle to one refresh request.
#[derive(Debug)]
pub struct RefreshTicket {
  seq:  u64,
  task: JoinHandle<bool>,
}

impl RefreshTicket {
  pub fn seq(&self) -> u64 { self.seq }

  /// Wait for the batch; `true` if its result was published. Superseded,
  /// aborted and closed requests report `false`.
  pub async fn applied(self) -> bool { self.task.await.unwrap_or(false) }
}
