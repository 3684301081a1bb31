//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | Insertion order |
//! | `POST`   | `/contacts` | Body: [`ContactDraft`]; returns 201 + stored record |
//! | `GET`    | `/contacts/next-id` | `{"next_id": n}` |
//! | `GET`    | `/contacts/:id` | 404 if not found |
//! | `PUT`    | `/contacts/:id` | Body: [`ContactDraft`]; full replace |
//! | `DELETE` | `/contacts/:id` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadastro_core::{
  lookup::AddressLookup,
  record::{ContactDraft, ContactRecord},
  store::ContactStore,
};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

fn not_found(id: u64) -> ApiError {
  ApiError::NotFound(format!("contact {id} not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S, L>(
  State(state): State<ApiState<S, L>>,
) -> Result<Json<Vec<ContactRecord>>, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  let records = state.store.list().await.map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts` — any `id` in the body is ignored.
pub async fn create<S, L>(
  State(state): State<ApiState<S, L>>,
  Json(draft): Json<ContactDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  let fields = draft.finalize()?;
  let record = state.store.create(fields).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Next id ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct NextId {
  pub next_id: u64,
}

/// `GET /contacts/next-id`
pub async fn next_id<S, L>(
  State(state): State<ApiState<S, L>>,
) -> Result<Json<NextId>, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  let next_id = state.store.next_id().await.map_err(ApiError::store)?;
  Ok(Json(NextId { next_id }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S, L>(
  State(state): State<ApiState<S, L>>,
  Path(id): Path<u64>,
) -> Result<Json<ContactRecord>, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  let record = state
    .store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(record))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /contacts/:id` — the body replaces every field of the record.
pub async fn update<S, L>(
  State(state): State<ApiState<S, L>>,
  Path(id): Path<u64>,
  Json(draft): Json<ContactDraft>,
) -> Result<Json<ContactRecord>, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  let fields = draft.finalize()?;
  let record = state
    .store
    .update(ContactRecord { id, fields })
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/:id`
pub async fn delete_one<S, L>(
  State(state): State<ApiState<S, L>>,
  Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
  S: ContactStore,
  L: AddressLookup,
{
  state
    .store
    .delete(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(StatusCode::NO_CONTENT)
}
