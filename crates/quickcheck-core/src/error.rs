//! Error types for `quickcheck-core`.

use std::fmt;

use thiserror::Error;

/// The kind of record a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
  User,
  Guest,
  Visit,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::User => "user",
      Self::Guest => "guest",
      Self::Visit => "visit",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: String },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("report error: {0}")]
  Report(#[from] csv::Error),
}

impl Error {
  pub fn not_found(entity: Entity, id: impl ToString) -> Self {
    Self::NotFound { entity, id: id.to_string() }
  }

  /// Wrap a backend error from a [`crate::store::LedgerStore`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
