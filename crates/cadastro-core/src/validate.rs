//! Field validation rules.
//!
//! Every rule is a pure predicate over a single value. Required-ness is
//! always checked separately from format, so an empty field reports
//! [`FieldError::Required`] and never a format error.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

use crate::record::RecordKind;

// ─── Patterns ────────────────────────────────────────────────────────────────

/// CPF layout: `DDD.DDD.DDD-DD`.
static CPF_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}$").expect("valid CPF pattern")
});

/// CNPJ layout: `DD.DDD.DDD/DDDD-DD`.
static CNPJ_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[0-9]{2}\.[0-9]{3}\.[0-9]{3}/[0-9]{4}-[0-9]{2}$")
    .expect("valid CNPJ pattern")
});

/// CEP: exactly eight ASCII digits.
static CEP_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("valid CEP pattern"));

// `\w` is spelled out as ASCII so that accented letters are rejected.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z]{2,3})+$",
  )
  .expect("valid email pattern")
});

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A single input of the contact form.
///
/// The declaration order is the form's tab order and the order in which
/// violations are reported.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
  Kind,
  DocumentNumber,
  LegalName,
  TradeName,
  PostalCode,
  Street,
  District,
  City,
  Phone,
  Email,
}

impl Field {
  /// Human-readable label for front-ends.
  pub fn label(self) -> &'static str {
    match self {
      Self::Kind => "Kind",
      Self::DocumentNumber => "CPF / CNPJ",
      Self::LegalName => "Name",
      Self::TradeName => "Trade name",
      Self::PostalCode => "CEP",
      Self::Street => "Street",
      Self::District => "District",
      Self::City => "City",
      Self::Phone => "Phone",
      Self::Email => "Email",
    }
  }
}

/// Why a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
  #[error("this field is required")]
  Required,

  #[error("kind must be individual (f) or organization (j)")]
  UnknownKind,

  #[error("document number does not match the format for this kind")]
  DocumentFormatInvalid,

  #[error("postal code must be exactly 8 digits")]
  PostalCodeFormatInvalid,

  #[error("email address is not valid")]
  EmailFormatInvalid,
}

// ─── Document rule ───────────────────────────────────────────────────────────

/// The document-number validator in force for a given record kind.
///
/// Derived from the kind on every kind change; never cached across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentRule {
  /// Individual taxpayer number.
  Cpf,
  /// Organization taxpayer number.
  Cnpj,
  /// No recognised kind is selected; any value passes.
  #[default]
  Unchecked,
}

impl DocumentRule {
  pub fn for_kind(kind: Option<RecordKind>) -> Self {
    match kind {
      Some(RecordKind::Individual) => Self::Cpf,
      Some(RecordKind::Organization) => Self::Cnpj,
      None => Self::Unchecked,
    }
  }

  /// The layout users are expected to type, for placeholders and hints.
  pub fn mask(self) -> Option<&'static str> {
    match self {
      Self::Cpf => Some("000.000.000-00"),
      Self::Cnpj => Some("00.000.000/0000-00"),
      Self::Unchecked => None,
    }
  }

  /// Check `value` against this rule. The empty value is left to the
  /// required check.
  pub fn check(self, value: &str) -> Result<(), FieldError> {
    let re = match self {
      Self::Cpf => &CPF_RE,
      Self::Cnpj => &CNPJ_RE,
      Self::Unchecked => return Ok(()),
    };
    if value.is_empty() || re.is_match(value) {
      Ok(())
    } else {
      Err(FieldError::DocumentFormatInvalid)
    }
  }
}

// ─── Single-value rules ──────────────────────────────────────────────────────

/// Fails when `value` is empty or only whitespace.
pub fn require(value: &str) -> Result<(), FieldError> {
  if value.trim().is_empty() {
    Err(FieldError::Required)
  } else {
    Ok(())
  }
}

/// Postal code format; the empty value is exempt.
pub fn check_postal_code(value: &str) -> Result<(), FieldError> {
  if value.is_empty() || CEP_RE.is_match(value) {
    Ok(())
  } else {
    Err(FieldError::PostalCodeFormatInvalid)
  }
}

/// Email format; the empty value is exempt.
pub fn check_email(value: &str) -> Result<(), FieldError> {
  if value.is_empty() || EMAIL_RE.is_match(value) {
    Ok(())
  } else {
    Err(FieldError::EmailFormatInvalid)
  }
}

// ─── Violations ──────────────────────────────────────────────────────────────

/// The failing fields of a form, at most one error per field, ordered by
/// [`Field`] declaration order.
///
/// Displays as the blocking message shown on a rejected submission; the
/// per-field detail is for inline feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(transparent)]
#[error("fill in all fields")]
pub struct Violations(BTreeMap<Field, FieldError>);

impl Violations {
  pub fn new() -> Self { Self::default() }

  /// Record the outcome of checking `field`, clearing any earlier error.
  pub fn record(&mut self, field: Field, outcome: Result<(), FieldError>) {
    match outcome {
      Ok(()) => {
        self.0.remove(&field);
      }
      Err(e) => {
        self.0.insert(field, e);
      }
    }
  }

  pub fn get(&self, field: Field) -> Option<FieldError> {
    self.0.get(&field).copied()
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
    self.0.keys().copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
    self.0.iter().map(|(f, e)| (*f, *e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cpf_rule_accepts_exact_layout() {
    assert_eq!(DocumentRule::Cpf.check("123.456.789-01"), Ok(()));
  }

  #[test]
  fn cpf_rule_rejects_other_layouts() {
    for bad in [
      "12.345.678-01",
      "12345678901",
      "123.456.789-012",
      " 123.456.789-01",
      "abc.def.ghi-jk",
      "12.345.678/0001-90",
    ] {
      assert_eq!(
        DocumentRule::Cpf.check(bad),
        Err(FieldError::DocumentFormatInvalid),
        "{bad:?} should be rejected"
      );
    }
  }

  #[test]
  fn cnpj_rule_accepts_exact_layout() {
    assert_eq!(DocumentRule::Cnpj.check("12.345.678/0001-90"), Ok(()));
    assert_eq!(
      DocumentRule::Cnpj.check("123.456.789-01"),
      Err(FieldError::DocumentFormatInvalid)
    );
  }

  #[test]
  fn unchecked_rule_accepts_anything() {
    for value in ["", "anything", "123.456.789-01", "!!"] {
      assert_eq!(DocumentRule::Unchecked.check(value), Ok(()));
    }
  }

  #[test]
  fn empty_document_is_left_to_required_check() {
    assert_eq!(DocumentRule::Cpf.check(""), Ok(()));
    assert_eq!(require(""), Err(FieldError::Required));
  }

  #[test]
  fn rule_follows_kind() {
    assert_eq!(
      DocumentRule::for_kind(Some(RecordKind::Individual)),
      DocumentRule::Cpf
    );
    assert_eq!(
      DocumentRule::for_kind(Some(RecordKind::Organization)),
      DocumentRule::Cnpj
    );
    assert_eq!(DocumentRule::for_kind(None), DocumentRule::Unchecked);
  }

  #[test]
  fn postal_code_needs_eight_digits() {
    assert_eq!(check_postal_code("85840000"), Ok(()));
    assert_eq!(check_postal_code("00000000"), Ok(()));
    assert_eq!(check_postal_code(""), Ok(()));
    for bad in ["8584000", "858400000", "85840-000", "8584000a", "８５８４００００"] {
      assert_eq!(
        check_postal_code(bad),
        Err(FieldError::PostalCodeFormatInvalid),
        "{bad:?} should be rejected"
      );
    }
  }

  #[test]
  fn email_shapes() {
    for good in [
      "a@b.co",
      "first.last@example.com",
      "first-last@mail.example.co.uk",
      "user_1@host-name.org",
    ] {
      assert_eq!(check_email(good), Ok(()), "{good:?} should pass");
    }
    for bad in [
      "emailname@examplemail",
      "no-at-sign.com",
      "a@b.c",
      "a@b.info",
      "a..b@example.com",
      "a@@example.com",
      "joão@example.com",
    ] {
      assert_eq!(
        check_email(bad),
        Err(FieldError::EmailFormatInvalid),
        "{bad:?} should fail"
      );
    }
  }

  #[test]
  fn email_required_and_pattern_are_independent() {
    assert_eq!(check_email(""), Ok(()));
    assert_eq!(require(""), Err(FieldError::Required));
    assert_eq!(require("nope"), Ok(()));
    assert_eq!(check_email("nope"), Err(FieldError::EmailFormatInvalid));
  }

  #[test]
  fn whitespace_only_is_missing() {
    assert_eq!(require("   "), Err(FieldError::Required));
  }

  #[test]
  fn violations_keep_one_error_per_field() {
    let mut v = Violations::new();
    v.record(Field::Email, Err(FieldError::Required));
    v.record(Field::Email, Err(FieldError::EmailFormatInvalid));
    v.record(Field::Phone, Err(FieldError::Required));
    assert_eq!(v.len(), 2);
    assert_eq!(v.get(Field::Email), Some(FieldError::EmailFormatInvalid));

    v.record(Field::Phone, Ok(()));
    assert_eq!(v.fields().collect::<Vec<_>>(), vec![Field::Email]);
    assert_eq!(v.to_string(), "fill in all fields");
  }

  #[test]
  fn violations_serialise_as_field_map() {
    let mut v = Violations::new();
    v.record(Field::PostalCode, Err(FieldError::PostalCodeFormatInvalid));
    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "postal_code": "postal_code_format_invalid" })
    );
  }
}
