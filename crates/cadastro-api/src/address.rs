//! Handler for `GET /address/:postal_code`.
//!
//! Answers 200 with the address, or 204 when the code is unknown or the
//! lookup service failed. A code that the lookup policy refuses to send
//! answers 422.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cadastro_core::{
  lookup::{AddressLookup, resolve_address},
  store::ContactStore,
  validate::{Field, FieldError, Violations},
};

use crate::{ApiState, error::ApiError};

/// `GET /address/:postal_code`
pub async fn lookup<S, L>(
  State(state): State<ApiState<S, L>>,
  Path(postal_code): Path<String>,
) -> Result<Response, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  if !state.policy.should_lookup(&postal_code) {
    let mut violations = Violations::new();
    // The path segment is never empty, so a refusal is always a format
    // failure.
    violations.record(Field::PostalCode, Err(FieldError::PostalCodeFormatInvalid));
    return Err(ApiError::Validation(violations));
  }

  Ok(match resolve_address(state.lookup.as_ref(), &postal_code).await {
    Some(address) => Json(address).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  })
}
