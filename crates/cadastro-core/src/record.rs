//! Contact records — the single entity of the registry.
//!
//! [`ContactDraft`] is what a user types; [`ContactFields`] is what survives
//! validation; [`ContactRecord`] is what the repository stores.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::validate::{
  DocumentRule, Field, FieldError, Violations, check_email, check_postal_code,
  require,
};

/// Value forced into the trade name of individuals on submission.
pub const TRADE_NAME_PLACEHOLDER: &str = "-";

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Whether a contact is a person or a company. Drives the document format
/// and whether a trade name is meaningful.
///
/// Parses from `individual`/`organization` or the short codes `f`/`j`,
/// ignoring ASCII case.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum RecordKind {
  #[serde(alias = "f")]
  #[strum(to_string = "individual", serialize = "f")]
  Individual,
  #[serde(alias = "j")]
  #[strum(to_string = "organization", serialize = "j")]
  Organization,
}

impl RecordKind {
  /// The one-letter code (`f` for *pessoa física*, `j` for *jurídica*).
  pub fn code(self) -> char {
    match self {
      Self::Individual => 'f',
      Self::Organization => 'j',
    }
  }

  pub fn other(self) -> Self {
    match self {
      Self::Individual => Self::Organization,
      Self::Organization => Self::Individual,
    }
  }
}

// ─── Validated payload ───────────────────────────────────────────────────────

/// Every field of a contact except its id, after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
  pub kind:            RecordKind,
  pub document_number: String,
  pub legal_name:      String,
  pub trade_name:      String,
  pub postal_code:     String,
  pub street:          String,
  pub district:        String,
  pub city:            String,
  pub phone:           String,
  pub email:           String,
}

/// A stored contact. The id is assigned by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
  pub id:     u64,
  #[serde(flatten)]
  pub fields: ContactFields,
}

impl ContactRecord {
  /// The example record a fresh registry is seeded with.
  pub fn example() -> Self {
    Self {
      id:     0,
      fields: ContactFields {
        kind:            RecordKind::Organization,
        document_number: "000.000.000-00".into(),
        legal_name:      "Cliente teste".into(),
        trade_name:      "Cliente Enterprises".into(),
        postal_code:     "85840000".into(),
        street:          "Rua Imaginária, 44".into(),
        district:        "Jardim Carla".into(),
        city:            "Foz do Iguaçu".into(),
        phone:           "+5545350000000".into(),
        email:           "emailname@examplemail".into(),
      },
    }
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Raw form input. Every field is free text, including the kind, so that a
/// half-filled form can be represented and checked field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
  pub kind:            String,
  pub document_number: String,
  pub legal_name:      String,
  pub trade_name:      String,
  pub postal_code:     String,
  pub street:          String,
  pub district:        String,
  pub city:            String,
  pub phone:           String,
  pub email:           String,
}

impl ContactDraft {
  /// The parsed kind, or `None` when the kind text is empty or unknown.
  pub fn kind(&self) -> Option<RecordKind> { self.kind.trim().parse().ok() }

  /// The document rule implied by the current kind text.
  pub fn document_rule(&self) -> DocumentRule {
    DocumentRule::for_kind(self.kind())
  }

  pub fn value(&self, field: Field) -> &str {
    match field {
      Field::Kind => &self.kind,
      Field::DocumentNumber => &self.document_number,
      Field::LegalName => &self.legal_name,
      Field::TradeName => &self.trade_name,
      Field::PostalCode => &self.postal_code,
      Field::Street => &self.street,
      Field::District => &self.district,
      Field::City => &self.city,
      Field::Phone => &self.phone,
      Field::Email => &self.email,
    }
  }

  pub fn value_mut(&mut self, field: Field) -> &mut String {
    match field {
      Field::Kind => &mut self.kind,
      Field::DocumentNumber => &mut self.document_number,
      Field::LegalName => &mut self.legal_name,
      Field::TradeName => &mut self.trade_name,
      Field::PostalCode => &mut self.postal_code,
      Field::Street => &mut self.street,
      Field::District => &mut self.district,
      Field::City => &mut self.city,
      Field::Phone => &mut self.phone,
      Field::Email => &mut self.email,
    }
  }

  /// Check a single field against its required and format rules.
  ///
  /// The trade name of an individual always passes: it is replaced by
  /// [`TRADE_NAME_PLACEHOLDER`] on submission.
  pub fn check(&self, field: Field) -> Result<(), FieldError> {
    let value = self.value(field);
    match field {
      Field::Kind => {
        require(value)?;
        self.kind().map(|_| ()).ok_or(FieldError::UnknownKind)
      }
      Field::TradeName if self.kind() == Some(RecordKind::Individual) => Ok(()),
      Field::DocumentNumber => {
        require(value)?;
        self.document_rule().check(value)
      }
      Field::PostalCode => {
        require(value)?;
        check_postal_code(value)
      }
      Field::Email => {
        require(value)?;
        check_email(value)
      }
      _ => require(value),
    }
  }

  /// All failing fields.
  pub fn violations(&self) -> Violations {
    let mut v = Violations::new();
    for field in Field::iter() {
      v.record(field, self.check(field));
    }
    v
  }

  /// Apply the submission-time rewrites (the individual trade-name
  /// placeholder).
  pub fn apply_submission_policy(&mut self) {
    if self.kind() == Some(RecordKind::Individual) {
      self.trade_name = TRADE_NAME_PLACEHOLDER.to_string();
    }
  }

  /// Apply the submission policy and every validator, producing the payload
  /// the repository accepts.
  pub fn finalize(mut self) -> Result<ContactFields, Violations> {
    self.apply_submission_policy();
    let violations = self.violations();
    let kind = match self.kind() {
      Some(kind) if violations.is_empty() => kind,
      _ => return Err(violations),
    };
    Ok(ContactFields {
      kind,
      document_number: self.document_number,
      legal_name: self.legal_name,
      trade_name: self.trade_name,
      postal_code: self.postal_code,
      street: self.street,
      district: self.district,
      city: self.city,
      phone: self.phone,
      email: self.email,
    })
  }
}

impl From<&ContactFields> for ContactDraft {
  fn from(f: &ContactFields) -> Self {
    ContactDraft {
      kind:            f.kind.code().to_string(),
      document_number: f.document_number.clone(),
      legal_name:      f.legal_name.clone(),
      trade_name:      f.trade_name.clone(),
      postal_code:     f.postal_code.clone(),
      street:          f.street.clone(),
      district:        f.district.clone(),
      city:            f.city.clone(),
      phone:           f.phone.clone(),
      email:           f.email.clone(),
    }
  }
}
