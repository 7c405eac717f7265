//! Error types for `balcao-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or blank.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("sequence number {0} is already in use")]
  DuplicateSequence(i64),

  /// The JSON side-channel of an order is not a JSON object.
  #[error("malformed extensions: {0}")]
  MalformedExtensions(String),

  #[error("invalid period: {start} is after {end}")]
  InvalidPeriod { start: NaiveDate, end: NaiveDate },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Errors that are reported to the user before any write happens.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation(_) | Self::DuplicateSequence(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
