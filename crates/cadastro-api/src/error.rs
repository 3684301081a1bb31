//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cadastro_core::validate::Violations;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The edit view cannot open; clients go back to the list.
  #[error("cannot edit: {0}")]
  EditRefused(String),

  #[error(transparent)]
  Validation(#[from] Violations),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl From<cadastro_core::Error> for ApiError {
  fn from(e: cadastro_core::Error) -> Self {
    use cadastro_core::Error;
    match e {
      Error::NotFound(_) | Error::HandoffMissing => ApiError::EditRefused(e.to_string()),
      Error::Validation(v) => ApiError::Validation(v),
      Error::Store(e) => ApiError::Store(e),
      Error::DuplicateId(_) | Error::ReservedId(_) => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::EditRefused(m) => (
        StatusCode::NOT_FOUND,
        json!({ "error": m, "redirect": "/" }),
      ),
      ApiError::Validation(v) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": v.to_string(), "fields": v }),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
