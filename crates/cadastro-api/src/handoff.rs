//! Handlers for the edit hand-off.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/handoff` | Body: `{"id": n}`; 204 |
//! | `POST` | `/handoff/take` | Consumes the key; 200 + record, or 404 + `{"redirect": "/"}` |

use axum::{Json, extract::State, http::StatusCode};
use cadastro_core::{
  handoff::begin_edit,
  lookup::AddressLookup,
  record::ContactRecord,
  store::ContactStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct OfferBody {
  pub id: u64,
}

/// `POST /handoff` — select a record for the edit view.
pub async fn offer<S, L>(
  State(state): State<ApiState<S, L>>,
  Json(body): Json<OfferBody>,
) -> StatusCode
where
  S: ContactStore,
  L: AddressLookup,
{
  state.handoff.offer(body.id);
  StatusCode::NO_CONTENT
}

/// `POST /handoff/take` — open the edit view for the selected record.
pub async fn take<S, L>(
  State(state): State<ApiState<S, L>>,
) -> Result<Json<ContactRecord>, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  let record = begin_edit(&state.handoff, state.store.as_ref()).await?;
  Ok(Json(record))
}
