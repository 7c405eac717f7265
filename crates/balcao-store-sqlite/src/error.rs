//! Error type for `balcao-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] balcao_core::Error),

  /// The connection or the database file is unusable.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A schema migration failed for a reason other than the column already
  /// existing. The store must not be used.
  #[error("schema migration failed on `{statement}`: {source}")]
  Migration {
    statement: String,
    #[source]
    source:    rusqlite::Error,
  },

  /// The Extensions blob changed between the read and the write of a merge.
  #[error("order {0} was modified concurrently; reload and retry")]
  ConcurrentModification(i64),
}

impl Error {
  /// Validation failures surfaced before any write.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Core(e) if e.is_validation())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
