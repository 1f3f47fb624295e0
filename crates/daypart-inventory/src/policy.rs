//! Timeout, retry and fan-out limits for ledger reads.

use std::time::Duration;

use serde::Deserialize;

/// How the inventory talks to a slow or flaky ledger.
///
/// Durations are whole milliseconds so the policy can live in a TOML file
/// or `DAYPART_INVENTORY__*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshPolicy {
  /// Upper bound on reads in flight at once.
  pub max_concurrent_reads: usize,
  /// Attempts per token, including the first. Zero is treated as one.
  pub max_attempts:         u32,
  pub initial_backoff_ms:   u64,
  pub max_backoff_ms:       u64,
  /// Deadline for a single attempt.
  pub read_timeout_ms:      u64,
}

impl Default for RefreshPolicy {
  fn default() -> Self {
    Self {
      max_concurrent_reads: 8,
      max_attempts:         3,
      initial_backoff_ms:   100,
      max_backoff_ms:       2_000,
      read_timeout_ms:      5_000,
    }
  }
}

impl RefreshPolicy {
  pub fn attempts(&self) -> u32 { self.max_attempts.max(1) }

  pub fn read_timeout(&self) -> Duration {
    Duration::from_millis(self.read_timeout_ms)
  }

  /// Delay before retrying after the `attempt`-th failure (1-based):
  /// exponential from `initial_backoff_ms`, capped at `max_backoff_ms`.
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 1u64
      .checked_shl(attempt.saturating_sub(1))
      .unwrap_or(u64::MAX);
    let ms = self
      .initial_backoff_ms
      .saturating_mul(factor)
      .min(self.max_backoff_ms);
    Duration::from_millis(ms)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backoff_doubles_then_caps() {
    let p = RefreshPolicy::default();
    assert_eq!(p.backoff(1), Duration::from_millis(100));
    assert_eq!(p.backoff(2), Duration::from_millis(200));
    assert_eq!(p.backoff(5), Duration::from_millis(1_600));
    assert_eq!(p.backoff(6), Duration::from_millis(2_000));
    assert_eq!(p.backoff(200), Duration::from_millis(2_000));
  }

  #[test]
  fn zero_attempts_means_one() {
    let p = RefreshPolicy { max_attempts: 0, ..RefreshPolicy::default() };
    assert_eq!(p.attempts(), 1);
  }
}
