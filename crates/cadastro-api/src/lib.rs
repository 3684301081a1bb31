//! JSON REST API for Cadastro.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cadastro_core::store::ContactStore`] and
//! [`cadastro_core::lookup::AddressLookup`]. TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cadastro_api::api_router(state))
//! ```

pub mod address;
pub mod contacts;
pub mod error;
pub mod handoff;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cadastro_core::{
  handoff::EditHandoff,
  lookup::{AddressLookup, LookupPolicy},
  store::ContactStore,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, L> {
  pub store:   Arc<S>,
  pub lookup:  Arc<L>,
  pub handoff: Arc<EditHandoff>,
  pub policy:  LookupPolicy,
}

impl<S, L> ApiState<S, L> {
  pub fn new(store: S, lookup: L, policy: LookupPolicy) -> Self {
    Self {
      store: Arc::new(store),
      lookup: Arc::new(lookup),
      handoff: Arc::new(EditHandoff::new()),
      policy,
    }
  }
}

// Manual impl: cloning only bumps the `Arc`s, so `S` and `L` need not be
// `Clone`.
impl<S, L> Clone for ApiState<S, L> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      lookup:  Arc::clone(&self.lookup),
      handoff: Arc::clone(&self.handoff),
      policy:  self.policy,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, L>(state: ApiState<S, L>) -> Router<()>
where
  S: ContactStore + 'static,
  L: AddressLookup + 'static,
{
  Router::new()
    // Contacts
    .route(
      "/contacts",
      get(contacts::list::<S, L>).post(contacts::create::<S, L>),
    )
    .route("/contacts/next-id", get(contacts::next_id::<S, L>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S, L>)
        .put(contacts::update::<S, L>)
        .delete(contacts::delete_one::<S, L>),
    )
    // Address lookup
    .route("/address/{postal_code}", get(address::lookup::<S, L>))
    // Edit hand-off
    .route("/handoff", post(handoff::offer::<S, L>))
    .route("/handoff/take", post(handoff::take::<S, L>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::{
    convert::Infallible,
    future::{Future, ready},
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use cadastro_core::{lookup::AddressInfo, store::MemoryStore};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  /// Knows a single postal code.
  struct OneCode;

  impl AddressLookup for OneCode {
    type Error = Infallible;

    fn lookup<'a>(
      &'a self,
      postal_code: &'a str,
    ) -> impl Future<Output = Result<Option<AddressInfo>, Self::Error>> + Send + 'a
    {
      let found = (postal_code == "85840000")
        .then(|| AddressInfo::new("Avenida Brasil", "Centro", "Céu Azul", "PR"));
      ready(Ok(found))
    }
  }

  fn state() -> ApiState<MemoryStore, OneCode> {
    ApiState::new(MemoryStore::seeded(), OneCode, LookupPolicy::default())
  }

  fn valid_body() -> Value {
    json!({
      "kind":            "f",
      "document_number": "123.456.789-01",
      "legal_name":      "Maria Souza",
      "postal_code":     "85840000",
      "street":          "Avenida Brasil",
      "district":        "Centro",
      "city":            "Céu Azul/PR",
      "phone":           "+55 45 99999-0000",
      "email":           "maria@example.com.br",
    })
  }

  async fn send(
    state: ApiState<MemoryStore, OneCode>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  // ── Contacts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_returns_seed() {
    let (status, body) = send(state(), "GET", "/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 0);
    assert_eq!(body[0]["legal_name"], "Cliente teste");
  }

  #[tokio::test]
  async fn create_assigns_next_id_and_placeholder() {
    let st = state();
    let mut body = valid_body();
    body["id"] = json!(99);
    body["trade_name"] = json!("ignored");

    let (status, created) = send(st.clone(), "POST", "/contacts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["kind"], "individual");
    assert_eq!(created["trade_name"], "-");

    let (_, next) = send(st, "GET", "/contacts/next-id", None).await;
    assert_eq!(next["next_id"], 2);
  }

  #[tokio::test]
  async fn create_with_bad_fields_is_422() {
    let st = state();
    let mut body = valid_body();
    body["kind"] = json!("j");
    body["email"] = json!("");

    let (status, err) = send(st.clone(), "POST", "/contacts", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["error"], "fill in all fields");
    assert_eq!(err["fields"]["document_number"], "document_format_invalid");
    assert_eq!(err["fields"]["trade_name"], "required");
    assert_eq!(err["fields"]["email"], "required");

    let (_, list) = send(st, "GET", "/contacts", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn get_missing_is_404() {
    let (status, err) = send(state(), "GET", "/contacts/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "contact 7 not found");
  }

  #[tokio::test]
  async fn update_replaces_in_place() {
    let st = state();
    send(st.clone(), "POST", "/contacts", Some(valid_body())).await;

    let mut body = valid_body();
    body["legal_name"] = json!("Maria Lima");
    let (status, updated) = send(st.clone(), "PUT", "/contacts/1", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["legal_name"], "Maria Lima");

    let (_, list) = send(st, "GET", "/contacts", None).await;
    let ids: Vec<_> = list.as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(0), json!(1)]);
  }

  #[tokio::test]
  async fn update_missing_is_404() {
    let (status, _) = send(state(), "PUT", "/contacts/5", Some(valid_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_then_missing() {
    let st = state();
    let (status, _) = send(st.clone(), "DELETE", "/contacts/0", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(st.clone(), "DELETE", "/contacts/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(st, "GET", "/contacts", None).await;
    assert!(list.as_array().unwrap().is_empty());
  }

  // ── Address lookup ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn address_hit() {
    let (status, body) = send(state(), "GET", "/address/85840000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Céu Azul/PR");
  }

  #[tokio::test]
  async fn address_miss_is_204() {
    let (status, body) = send(state(), "GET", "/address/99999999", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
  }

  #[tokio::test]
  async fn malformed_code_is_not_sent() {
    let (status, body) = send(state(), "GET", "/address/8584", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["postal_code"], "postal_code_format_invalid");
  }

  // ── Hand-off ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn handoff_is_consumed_once() {
    let st = state();
    let (status, _) = send(st.clone(), "POST", "/handoff", Some(json!({ "id": 0 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, record) = send(st.clone(), "POST", "/handoff/take", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["id"], 0);

    let (status, err) = send(st, "POST", "/handoff/take", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["redirect"], "/");
  }

  #[tokio::test]
  async fn handoff_to_deleted_record_redirects() {
    let st = state();
    send(st.clone(), "POST", "/handoff", Some(json!({ "id": 0 }))).await;
    send(st.clone(), "DELETE", "/contacts/0", None).await;

    let (status, err) = send(st, "POST", "/handoff/take", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "contact not found: 0");
    assert_eq!(err["redirect"], "/");
  }
}
