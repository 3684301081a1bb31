//! Error types for `cadastro-core`.

use thiserror::Error;

use crate::validate::Violations;

#[derive(Debug, Error)]
pub enum Error {
  #[error("contact not found: {0}")]
  NotFound(u64),

  #[error("contact id {0} appears more than once")]
  DuplicateId(u64),

  #[error("contact id {0} is reserved")]
  ReservedId(u64),

  #[error("no contact was selected for editing")]
  HandoffMissing,

  #[error(transparent)]
  Validation(#[from] Violations),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
