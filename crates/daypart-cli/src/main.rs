//! `daypart`: mint and inspect tokens that follow the time of day.
//!
//! # Usage
//!
//! ```text
//! daypart mint --owner 0xa11ce --offset UTC+5:30
//! daypart list
//! daypart show 3 --svg > token.svg
//! daypart classify --offset=-540 --at 2024-06-01T12:00:00Z
//! daypart decode 'data:application/json;base64,eyJuYW1lIjoi...'
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use daypart_core::{TimePoint, TokenId};
use daypart_ledger_sqlite::SqliteLedger;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::CliConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "daypart", version, about = "Time-of-day collectibles")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "daypart.toml", value_name = "FILE")]
  config: PathBuf,

  /// Ledger file; overrides `ledger_path` from the config.
  #[arg(long, value_name = "FILE")]
  ledger: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Mint the next token with a fixed timezone offset.
  Mint {
    #[arg(long)]
    owner:   String,
    /// Minutes (`330`) or clock notation (`UTC+5:30`).
    #[arg(long, allow_hyphen_values = true)]
    offset:  String,
    /// Wei to pay; defaults to the configured mint price.
    #[arg(long)]
    payment: Option<u128>,
  },

  /// Refresh and print every live token.
  List {
    /// Classify at this RFC 3339 instant instead of now.
    #[arg(long, value_parser = parse_at)]
    at: Option<TimePoint>,
  },

  /// Print one token's descriptor and time info.
  Show {
    /// Token id, `7` or `#7`.
    id:  TokenId,
    /// Print the decoded SVG artwork instead.
    #[arg(long)]
    svg: bool,
  },

  /// Classify an instant for an offset. Needs no ledger.
  Classify {
    #[arg(long, allow_hyphen_values = true)]
    offset: String,
    #[arg(long, value_parser = parse_at)]
    at:     Option<TimePoint>,
  },

  /// Decode a descriptor URI.
  Decode { descriptor: String },
}

fn parse_at(s: &str) -> Result<TimePoint, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| TimePoint::from(dt.with_timezone(&Utc)))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Classify { offset, at } => commands::classify(&offset, at),
    Command::Decode { descriptor } => commands::decode(&descriptor),
    Command::Mint { owner, offset, payment } => {
      let (cfg, ledger) = open(&cli.config, cli.ledger).await?;
      commands::mint(&ledger, &cfg, &owner, &offset, payment).await
    }
    Command::List { at } => {
      let (cfg, ledger) = open(&cli.config, cli.ledger).await?;
      commands::list(ledger, cfg.inventory, at).await
    }
    Command::Show { id, svg } => {
      let (_, ledger) = open(&cli.config, cli.ledger).await?;
      commands::show(&ledger, id, svg).await
    }
  }
}

/// Load configuration and open the ledger it points at.
async fn open(
  config: &std::path::Path,
  ledger: Option<PathBuf>,
) -> anyhow::Result<(CliConfig, SqliteLedger)> {
  let cfg = CliConfig::load(config)?;
  let path = ledger.unwrap_or_else(|| cfg.ledger_path());

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let ledger = SqliteLedger::open(&path, cfg.ledger())
    .await
    .with_context(|| format!("failed to open ledger at {path:?}"))?;

  Ok((cfg, ledger))
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory as _;

  use super::*;

  #[test]
  fn cli_definition_is_consistent() { Cli::command().debug_assert(); }

  #[test]
  fn at_accepts_any_rfc3339_offset() {
    assert_eq!(parse_at("2024-06-01T00:00:00Z").unwrap(), TimePoint(1_717_200_000));
    assert_eq!(
      parse_at("2024-06-01T05:30:00+05:30").unwrap(),
      TimePoint(1_717_200_000)
    );
    assert!(parse_at("2024-06-01").is_err());
  }

  #[test]
  fn negative_offsets_parse_as_values() {
    let cli =
      Cli::try_parse_from(["daypart", "classify", "--offset", "-540"]).unwrap();
    let Command::Classify { offset, at } = cli.command else {
      panic!("expected classify");
    };
    assert_eq!(offset, "-540");
    assert!(at.is_none());
  }

  #[test]
  fn show_takes_hash_prefixed_ids() {
    let cli = Cli::try_parse_from(["daypart", "show", "#7"]).unwrap();
    assert!(matches!(cli.command, Command::Show { id, svg: false } if id.get() == 7));
  }
}
