//! The `ContactStore` trait and its in-memory implementation.
//!
//! Front-ends (`cadastro-api`, `cadastro-tui`) depend on this abstraction,
//! not on [`ContactRepository`] directly.

use std::{
  convert::Infallible,
  future::{Future, ready},
  sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
  record::{ContactFields, ContactRecord},
  repository::ContactRepository,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a contact store backend.
///
/// Missing records are reported as `None` rather than as errors; the error
/// type is reserved for backend failures.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store a new record; the id is assigned by the store.
  fn create(
    &self,
    fields: ContactFields,
  ) -> impl Future<Output = Result<ContactRecord, Self::Error>> + Send + '_;

  /// Replace the record with `record.id`. Returns `None` if no such record.
  fn update(
    &self,
    record: ContactRecord,
  ) -> impl Future<Output = Result<Option<ContactRecord>, Self::Error>> + Send + '_;

  /// Remove a record by id, returning it. Returns `None` if absent.
  fn delete(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<Option<ContactRecord>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<Option<ContactRecord>, Self::Error>> + Send + '_;

  /// All records in insertion order.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactRecord>, Self::Error>> + Send + '_;

  /// The id the next `create` will assign.
  fn next_id(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Memory store ────────────────────────────────────────────────────────────

/// A [`ContactStore`] over a shared [`ContactRepository`].
///
/// Cloning is cheap — clones share the same repository. Construct one at
/// process start and hand clones to every consumer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<ContactRepository>>,
}

impl MemoryStore {
  pub fn new(repository: ContactRepository) -> Self {
    Self {
      inner: Arc::new(RwLock::new(repository)),
    }
  }

  /// A store holding the example record.
  pub fn seeded() -> Self { Self::new(ContactRepository::seeded()) }

  // A panic while holding the lock cannot leave the repository half-written:
  // every mutation is a single Vec operation.
  fn read(&self) -> RwLockReadGuard<'_, ContactRepository> {
    self.inner.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, ContactRepository> {
    self.inner.write().unwrap_or_else(PoisonError::into_inner)
  }
}

impl ContactStore for MemoryStore {
  type Error = Infallible;

  fn create(
    &self,
    fields: ContactFields,
  ) -> impl Future<Output = Result<ContactRecord, Self::Error>> + Send + '_ {
    ready(Ok(self.write().create(fields)))
  }

  fn update(
    &self,
    record: ContactRecord,
  ) -> impl Future<Output = Result<Option<ContactRecord>, Self::Error>> + Send + '_
  {
    // The repository only rejects an update with `NotFound`.
    ready(Ok(self.write().update(record).ok()))
  }

  fn delete(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<Option<ContactRecord>, Self::Error>> + Send + '_
  {
    ready(Ok(self.write().delete(id)))
  }

  fn get(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<Option<ContactRecord>, Self::Error>> + Send + '_
  {
    ready(Ok(self.read().get(id)))
  }

  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactRecord>, Self::Error>> + Send + '_
  {
    ready(Ok(self.read().list()))
  }

  fn next_id(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_ {
    ready(Ok(self.read().next_id()))
  }
}
