//! The add/edit form controller.
//!
//! A [`ContactForm`] owns the raw field values of one open form together
//! with their dirty and error state. Field edits go through
//! [`ContactForm::set`], which applies the reactive rules:
//!
//! - a kind change re-derives the document rule and re-checks the document
//!   number, even if the user never touched it;
//! - a postal-code change may ask the caller to run an address lookup, whose
//!   result comes back through [`ContactForm::apply_lookup`] tagged with a
//!   [`LookupTicket`] so that stale results can be dropped.

use std::collections::BTreeSet;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
  lookup::{AddressInfo, LookupPolicy},
  record::{ContactDraft, ContactFields, ContactRecord, RecordKind},
  validate::{DocumentRule, Field, FieldError, Violations},
};

// ─── Supporting types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
  Create,
  Edit { id: u64 },
}

/// Identifies one lookup issued by one form. Only the ticket of the latest
/// postal-code edit of the form that issued it is accepted back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupTicket {
  session: u64,
  seq:     u64,
}

impl LookupTicket {
  pub fn session(&self) -> u64 { self.session }
}

/// An address lookup the caller should run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
  pub postal_code: String,
  pub ticket:      LookupTicket,
}

/// What an accepted submission asks the repository to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
  Create(ContactFields),
  Update(ContactRecord),
}

// ─── Form ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ContactForm {
  /// Distinguishes this form's lookup tickets from any other form's.
  session:    u64,
  mode:       FormMode,
  draft:      ContactDraft,
  rule:       DocumentRule,
  policy:     LookupPolicy,
  dirty:      BTreeSet<Field>,
  errors:     Violations,
  lookup_seq: u64,
}

impl ContactForm {
  /// A blank add form with the kind preset to individual.
  pub fn create(session: u64, policy: LookupPolicy) -> Self {
    let draft = ContactDraft {
      kind: RecordKind::Individual.code().to_string(),
      ..ContactDraft::default()
    };
    Self::with_draft(session, FormMode::Create, draft, policy)
  }

  /// An edit form loaded with `record`. Loading does not trigger a lookup.
  pub fn edit(session: u64, record: &ContactRecord, policy: LookupPolicy) -> Self {
    Self::with_draft(
      session,
      FormMode::Edit { id: record.id },
      ContactDraft::from(&record.fields),
      policy,
    )
  }

  fn with_draft(
    session: u64,
    mode: FormMode,
    draft: ContactDraft,
    policy: LookupPolicy,
  ) -> Self {
    let mut form = Self {
      session,
      mode,
      rule: draft.document_rule(),
      draft,
      policy,
      dirty: BTreeSet::new(),
      errors: Violations::new(),
      lookup_seq: 0,
    };
    form.revalidate_all();
    form
  }

  // ── Accessors ───────────────────────────────────────────────────────────

  pub fn mode(&self) -> FormMode { self.mode }

  pub fn value(&self, field: Field) -> &str { self.draft.value(field) }

  pub fn kind(&self) -> Option<RecordKind> { self.draft.kind() }

  /// The document rule currently in force.
  pub fn document_rule(&self) -> DocumentRule { self.rule }

  pub fn error(&self, field: Field) -> Option<FieldError> {
    self.errors.get(field)
  }

  pub fn is_dirty(&self, field: Field) -> bool { self.dirty.contains(&field) }

  /// Whether to flag the field inline: it fails a rule and the user has
  /// touched it (or tried to submit).
  pub fn is_invalid(&self, field: Field) -> bool {
    self.is_dirty(field) && self.error(field).is_some()
  }

  pub fn is_valid(&self) -> bool { self.errors.is_empty() }

  // ── Edits ───────────────────────────────────────────────────────────────

  /// Store a user edit and apply the reactive rules. Returns the lookup to
  /// start, if the edit calls for one.
  pub fn set(
    &mut self,
    field: Field,
    value: impl Into<String>,
  ) -> Option<LookupRequest> {
    *self.draft.value_mut(field) = value.into();
    self.dirty.insert(field);
    self.revalidate(field);

    match field {
      Field::Kind => {
        self.refresh_document_rule();
        None
      }
      Field::PostalCode => self.postal_code_changed(),
      _ => None,
    }
  }

  /// Convenience for selecting a kind.
  pub fn set_kind(&mut self, kind: RecordKind) {
    self.set(Field::Kind, kind.code().to_string());
  }

  fn refresh_document_rule(&mut self) {
    self.rule = self.draft.document_rule();
    self.revalidate(Field::DocumentNumber);
    self.revalidate(Field::TradeName);
  }

  fn postal_code_changed(&mut self) -> Option<LookupRequest> {
    // Every edit invalidates lookups already in flight.
    self.lookup_seq += 1;
    let postal_code = self.draft.postal_code.clone();
    if !self.policy.should_lookup(&postal_code) {
      return None;
    }
    Some(LookupRequest {
      postal_code,
      ticket: LookupTicket {
        session: self.session,
        seq:     self.lookup_seq,
      },
    })
  }

  /// Apply a finished lookup. Stale tickets and misses leave the form
  /// untouched. Returns whether any field was patched.
  pub fn apply_lookup(
    &mut self,
    ticket: LookupTicket,
    address: Option<AddressInfo>,
  ) -> bool {
    if ticket.session != self.session || ticket.seq != self.lookup_seq {
      debug!(session = self.session, "discarding stale address lookup");
      return false;
    }
    let Some(address) = address else {
      return false;
    };
    self.draft.street = address.street;
    self.draft.district = address.district;
    self.draft.city = address.city;
    for field in [Field::Street, Field::District, Field::City] {
      self.revalidate(field);
    }
    true
  }

  fn revalidate(&mut self, field: Field) {
    let outcome = self.draft.check(field);
    self.errors.record(field, outcome);
  }

  fn revalidate_all(&mut self) {
    for field in Field::iter() {
      self.revalidate(field);
    }
  }

  // ── Submission ──────────────────────────────────────────────────────────

  /// Validate the whole form and, if it passes, describe the repository
  /// operation to perform. On failure every failing field is marked dirty so
  /// it shows inline.
  pub fn submit(&mut self) -> Result<Submission, Violations> {
    self.draft.apply_submission_policy();
    self.refresh_document_rule();
    self.revalidate_all();

    match self.draft.clone().finalize() {
      Ok(fields) => Ok(match self.mode {
        FormMode::Create => Submission::Create(fields),
        FormMode::Edit { id } => Submission::Update(ContactRecord { id, fields }),
      }),
      Err(violations) => {
        self.dirty.extend(violations.fields());
        Err(violations)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{record::TRADE_NAME_PLACEHOLDER, tests::individual_draft};

  fn filled_create_form() -> ContactForm {
    let mut form = ContactForm::create(1, LookupPolicy::default());
    let draft = individual_draft();
    for field in Field::iter() {
      form.set(field, draft.value(field));
    }
    form
  }

  #[test]
  fn create_form_starts_as_individual() {
    let form = ContactForm::create(1, LookupPolicy::default());
    assert_eq!(form.kind(), Some(RecordKind::Individual));
    assert_eq!(form.document_rule(), DocumentRule::Cpf);
    assert!(!form.is_valid());
    // Nothing is flagged before the user touches it.
    assert!(Field::iter().all(|f| !form.is_invalid(f)));
  }

  #[test]
  fn kind_switch_revalidates_untouched_document() {
    let mut form = filled_create_form();
    assert_eq!(form.error(Field::DocumentNumber), None);

    form.set_kind(RecordKind::Organization);
    assert_eq!(form.document_rule(), DocumentRule::Cnpj);
    assert_eq!(
      form.error(Field::DocumentNumber),
      Some(FieldError::DocumentFormatInvalid)
    );

    form.set_kind(RecordKind::Individual);
    assert_eq!(form.error(Field::DocumentNumber), None);
  }

  #[test]
  fn invalid_needs_dirty() {
    let mut form = ContactForm::create(1, LookupPolicy::default());
    assert!(!form.is_invalid(Field::Email));
    form.set(Field::Email, "not-an-email");
    assert!(form.is_invalid(Field::Email));
    assert_eq!(form.error(Field::Email), Some(FieldError::EmailFormatInvalid));
  }

  #[test]
  fn postal_code_edit_requests_lookup_when_valid() {
    let mut form = ContactForm::create(9, LookupPolicy::default());
    assert_eq!(form.set(Field::PostalCode, "8584"), None);
    let request = form.set(Field::PostalCode, "85840000").unwrap();
    assert_eq!(request.postal_code, "85840000");
    assert_eq!(request.ticket.session(), 9);
  }

  #[test]
  fn ungated_policy_requests_lookup_for_partial_codes() {
    let policy = LookupPolicy {
      require_valid_format: false,
    };
    let mut form = ContactForm::create(1, policy);
    assert!(form.set(Field::PostalCode, "8584").is_some());
    assert!(form.set(Field::PostalCode, "").is_none());
  }

  #[test]
  fn lookup_hit_patches_address() {
    let mut form = ContactForm::create(1, LookupPolicy::default());
    let request = form.set(Field::PostalCode, "85840000").unwrap();
    let patched = form.apply_lookup(
      request.ticket,
      Some(AddressInfo::new("Rua A", "Centro", "Céu Azul", "PR")),
    );
    assert!(patched);
    assert_eq!(form.value(Field::Street), "Rua A");
    assert_eq!(form.value(Field::District), "Centro");
    assert_eq!(form.value(Field::City), "Céu Azul/PR");
    assert_eq!(form.error(Field::City), None);
  }

  #[test]
  fn lookup_miss_leaves_address_untouched() {
    let mut form = ContactForm::create(1, LookupPolicy::default());
    form.set(Field::Street, "Rua Velha");
    form.set(Field::District, "Bairro");
    form.set(Field::City, "Cidade/UF");
    let request = form.set(Field::PostalCode, "99999999").unwrap();

    assert!(!form.apply_lookup(request.ticket, None));
    assert_eq!(form.value(Field::Street), "Rua Velha");
    assert_eq!(form.value(Field::District), "Bairro");
    assert_eq!(form.value(Field::City), "Cidade/UF");
  }

  #[test]
  fn superseded_lookup_is_discarded() {
    let mut form = ContactForm::create(1, LookupPolicy::default());
    let first = form.set(Field::PostalCode, "85840000").unwrap();
    let second = form.set(Field::PostalCode, "01001000").unwrap();

    let stale = AddressInfo::new("Old", "Old", "Old", "XX");
    assert!(!form.apply_lookup(first.ticket, Some(stale)));
    assert_eq!(form.value(Field::Street), "");

    let fresh = AddressInfo::new("Praça da Sé", "Sé", "São Paulo", "SP");
    assert!(form.apply_lookup(second.ticket, Some(fresh)));
  }

  #[test]
  fn lookup_from_another_form_is_discarded() {
    let mut old = ContactForm::create(1, LookupPolicy::default());
    let request = old.set(Field::PostalCode, "85840000").unwrap();

    let mut current = ContactForm::create(2, LookupPolicy::default());
    current.set(Field::PostalCode, "85840000");
    let address = AddressInfo::new("Rua A", "Centro", "Céu Azul", "PR");
    assert!(!current.apply_lookup(request.ticket, Some(address)));
  }

  #[test]
  fn submit_create_forces_placeholder() {
    let mut form = filled_create_form();
    match form.submit().unwrap() {
      Submission::Create(fields) => {
        assert_eq!(fields.trade_name, TRADE_NAME_PLACEHOLDER);
        assert_eq!(fields.document_number, "123.456.789-01");
      }
      other => panic!("unexpected submission: {other:?}"),
    }
    assert_eq!(form.value(Field::TradeName), TRADE_NAME_PLACEHOLDER);
  }

  #[test]
  fn failed_submit_marks_fields_dirty() {
    let mut form = ContactForm::create(1, LookupPolicy::default());
    form.set(Field::LegalName, "Maria");
    let violations = form.submit().unwrap_err();
    assert_eq!(violations.to_string(), "fill in all fields");
    assert!(violations.get(Field::LegalName).is_none());
    assert!(form.is_invalid(Field::Email));
    assert!(form.is_invalid(Field::DocumentNumber));
    assert!(!form.is_invalid(Field::TradeName));
  }

  #[test]
  fn edit_form_submits_update_with_same_id() {
    let mut record = ContactRecord::example();
    record.fields.email = "contato@cliente.com.br".into();
    record.fields.document_number = "12.345.678/0001-90".into();

    let mut form = ContactForm::edit(5, &record, LookupPolicy::default());
    assert_eq!(form.mode(), FormMode::Edit { id: 0 });
    assert!(form.is_valid());

    form.set(Field::Phone, "+55 45 3500-0001");
    match form.submit().unwrap() {
      Submission::Update(updated) => {
        assert_eq!(updated.id, 0);
        assert_eq!(updated.fields.phone, "+55 45 3500-0001");
        assert_eq!(updated.fields.trade_name, "Cliente Enterprises");
      }
      other => panic!("unexpected submission: {other:?}"),
    }
  }

  #[test]
  fn seed_record_fails_submission_as_loaded() {
    // The example record carries a CPF-shaped document on an organization
    // and an email without a top-level domain.
    let mut form = ContactForm::edit(1, &ContactRecord::example(), LookupPolicy::default());
    let violations = form.submit().unwrap_err();
    assert_eq!(
      violations.get(Field::DocumentNumber),
      Some(FieldError::DocumentFormatInvalid)
    );
    assert_eq!(violations.get(Field::Email), Some(FieldError::EmailFormatInvalid));
  }
}
