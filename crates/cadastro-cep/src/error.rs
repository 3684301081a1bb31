//! Error type for `cadastro-cep`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid lookup base url {0:?}")]
  BaseUrl(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("lookup service answered {0}")]
  Status(reqwest::StatusCode),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
