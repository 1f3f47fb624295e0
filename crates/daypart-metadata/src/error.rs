//! Error types for the daypart-metadata codec.
//!
//! Each decode stage fails with its own variant so callers can tell "not our
//! format" ([`Error::BadPrefix`]) from "our format, but corrupted"
//! ([`Error::BadBase64`], [`Error::MalformedJson`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing data URI prefix {expected:?}")]
  BadPrefix { expected: &'static str },

  #[error("payload is not valid base64: {0}")]
  BadBase64(#[source] base64::DecodeError),

  #[error("payload is not a valid metadata document: {0}")]
  MalformedJson(#[source] serde_json::Error),

  #[error("image payload is not UTF-8: {0}")]
  ImageNotUtf8(#[from] std::string::FromUtf8Error),

  #[error("failed to serialise metadata: {0}")]
  Encode(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
