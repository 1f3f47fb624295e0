//! Error type for `daypart-ledger-sqlite`.

use daypart_core::ledger::Transient;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Mint rejections and other domain errors.
  #[error(transparent)]
  Core(#[from] daypart_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("metadata error: {0}")]
  Metadata(#[from] daypart_metadata::Error),

  /// A stored row violates a domain invariant.
  #[error("corrupt ledger row: {0}")]
  Corrupt(String),
}

impl Transient for Error {
  fn is_transient(&self) -> bool {
    match self {
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => true,
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
      ),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
