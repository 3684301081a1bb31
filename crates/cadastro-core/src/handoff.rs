//! The edit hand-off: a single, consume-once slot telling the edit view
//! which record to load.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::{Error, Result, record::ContactRecord, store::ContactStore};

#[derive(Debug, Default)]
pub struct EditHandoff {
  slot: Mutex<Option<u64>>,
}

impl EditHandoff {
  pub fn new() -> Self { Self::default() }

  /// Select `id` for editing, replacing any earlier selection.
  pub fn offer(&self, id: u64) {
    debug!(id, "edit hand-off offered");
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
  }

  /// Consume the selection. A second call returns `None`.
  pub fn take(&self) -> Option<u64> {
    self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
  }

  pub fn is_pending(&self) -> bool {
    self
      .slot
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .is_some()
  }
}

/// Consume the hand-off and load the selected record.
///
/// Fails with [`Error::HandoffMissing`] when nothing was offered and with
/// [`Error::NotFound`] when the record has since disappeared. Either way the
/// caller returns to the list view.
pub async fn begin_edit<S>(handoff: &EditHandoff, store: &S) -> Result<ContactRecord>
where
  S: ContactStore,
{
  let id = handoff.take().ok_or(Error::HandoffMissing)?;
  store
    .get(id)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NotFound(id))
}
