//! [`ContactRepository`] — the ordered, in-memory collection of contacts.
//!
//! Insertion order is the canonical list order. Ids are assigned here and
//! nowhere else.

use std::collections::HashSet;

use tracing::info;

use crate::{
  Error, Result,
  record::{ContactFields, ContactRecord},
};

#[derive(Debug, Clone, Default)]
pub struct ContactRepository {
  records: Vec<ContactRecord>,
}

impl ContactRepository {
  /// An empty repository.
  pub fn new() -> Self { Self::default() }

  /// A repository holding the single [`ContactRecord::example`] record.
  pub fn seeded() -> Self {
    Self {
      records: vec![ContactRecord::example()],
    }
  }

  /// Store `fields` as a new record under the next free id.
  pub fn create(&mut self, fields: ContactFields) -> ContactRecord {
    let record = ContactRecord {
      id: self.next_id(),
      fields,
    };
    info!(id = record.id, kind = %record.fields.kind, "contact created");
    self.records.push(record.clone());
    record
  }

  /// Replace the record with the same id, keeping its position.
  pub fn update(&mut self, record: ContactRecord) -> Result<ContactRecord> {
    let slot = self
      .records
      .iter_mut()
      .find(|r| r.id == record.id)
      .ok_or(Error::NotFound(record.id))?;
    *slot = record.clone();
    info!(id = record.id, "contact updated");
    Ok(record)
  }

  /// Remove the first record with `id`. Absent ids leave the collection
  /// untouched.
  pub fn delete(&mut self, id: u64) -> Option<ContactRecord> {
    let index = self.records.iter().position(|r| r.id == id)?;
    info!(id, "contact deleted");
    Some(self.records.remove(index))
  }

  pub fn get(&self, id: u64) -> Option<ContactRecord> {
    self.records.iter().find(|r| r.id == id).cloned()
  }

  /// A copy of every record in insertion order.
  pub fn list(&self) -> Vec<ContactRecord> { self.records.clone() }

  /// Rebuild a repository from existing records, keeping their order.
  ///
  /// Fails on the first id that is repeated, and on `u64::MAX`, which no
  /// record may hold since `next_id` would have nowhere to go.
  pub fn from_records(records: impl IntoIterator<Item = ContactRecord>) -> Result<Self> {
    let mut seen = HashSet::new();
    let mut repo = Self::new();
    for record in records {
      if record.id == u64::MAX {
        return Err(Error::ReservedId(record.id));
      }
      if !seen.insert(record.id) {
        return Err(Error::DuplicateId(record.id));
      }
      repo.records.push(record);
    }
    Ok(repo)
  }

  /// One past the highest id in use, or `1` when empty. An existing id of
  /// `0` is an ordinary id.
  ///
  /// Ids stay below `u64::MAX`: `from_records` refuses it and `create` would
  /// need 2^64 calls to reach it.
  pub fn next_id(&self) -> u64 {
    self
      .records
      .iter()
      .map(|r| r.id)
      .max()
      .map_or(1, |max| max.saturating_add(1))
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}
