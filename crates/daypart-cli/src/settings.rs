//! Layered configuration: optional TOML file, then `DAYPART_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use daypart_core::OffsetPolicy;
use daypart_inventory::RefreshPolicy;
use daypart_ledger_sqlite::LedgerConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
  /// SQLite ledger file. A leading `~/` is expanded.
  pub ledger_path:        PathBuf,
  /// Wei. Kept to `u64` so it can come from a plain TOML integer.
  pub mint_price:         u64,
  pub max_supply:         u64,
  pub offset_granularity: OffsetPolicy,
  pub inventory:          RefreshPolicy,
}

impl Default for CliConfig {
  fn default() -> Self {
    let ledger = LedgerConfig::default();
    Self {
      ledger_path:        PathBuf::from("~/.local/share/daypart/ledger.sqlite"),
      mint_price:         ledger.mint_price.try_into().unwrap_or(u64::MAX),
      max_supply:         ledger.max_supply,
      offset_granularity: ledger.offset_granularity,
      inventory:          RefreshPolicy::default(),
    }
  }
}

impl CliConfig {
  /// Read `file` (if it exists) and the environment.
  ///
  /// Nested keys use a double underscore, e.g.
  /// `DAYPART_INVENTORY__MAX_ATTEMPTS=5`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("DAYPART")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config")?
      .try_deserialize()
      .context("failed to deserialise CliConfig")
  }

  pub fn ledger(&self) -> LedgerConfig {
    LedgerConfig {
      mint_price:         u128::from(self.mint_price),
      max_supply:         self.max_supply,
      offset_granularity: self.offset_granularity,
    }
  }

  pub fn ledger_path(&self) -> PathBuf { expand_tilde(&self.ledger_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> CliConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn missing_keys_fall_back_to_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.max_supply, 1000);
    assert_eq!(cfg.mint_price, 10_000_000_000_000_000);
    assert_eq!(cfg.offset_granularity.granularity(), 1);
    assert_eq!(cfg.inventory, RefreshPolicy::default());
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
      ledger_path = "/var/lib/daypart.sqlite"
      max_supply = 50
      mint_price = 20000000000000000
      offset_granularity = 15

      [inventory]
      max_attempts = 5
      read_timeout_ms = 250
      "#,
    );
    assert_eq!(cfg.ledger_path(), PathBuf::from("/var/lib/daypart.sqlite"));
    assert_eq!(cfg.ledger().max_supply, 50);
    assert_eq!(cfg.ledger().mint_price, 20_000_000_000_000_000u128);
    assert_eq!(cfg.ledger().offset_granularity.granularity(), 15);
    assert_eq!(cfg.inventory.max_attempts, 5);
    assert_eq!(cfg.inventory.read_timeout_ms, 250);
    assert_eq!(cfg.inventory.max_concurrent_reads, 8);
  }

  #[test]
  fn bad_granularity_is_rejected() {
    let result = config::Config::builder()
      .add_source(config::File::from_str("offset_granularity = 7", FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize::<CliConfig>();
    assert!(result.is_err());
  }

  #[test]
  fn tilde_expands_only_as_prefix() {
    let home = std::env::var("HOME").unwrap_or_default();
    if !home.is_empty() {
      assert_eq!(expand_tilde(Path::new("~/x.sqlite")), Path::new(&home).join("x.sqlite"));
    }
    assert_eq!(expand_tilde(Path::new("/a/~/b")), PathBuf::from("/a/~/b"));
    assert_eq!(expand_tilde(Path::new("rel.sqlite")), PathBuf::from("rel.sqlite"));
  }
}
