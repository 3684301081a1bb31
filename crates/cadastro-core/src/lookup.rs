//! Postal-code address lookup — the seam to the external CEP service.
//!
//! Implemented by `cadastro-cep`. "Not found" is an ordinary outcome
//! (`Ok(None)`), never an error, and callers go through [`resolve_address`]
//! so that transport failures are silent as well.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::validate::check_postal_code;

/// Address fields returned for a postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
  pub street:   String,
  pub district: String,
  /// `"<locality>/<region>"`, e.g. `"Foz do Iguaçu/PR"`.
  pub city:     String,
}

impl AddressInfo {
  pub fn new(
    street: impl Into<String>,
    district: impl Into<String>,
    locality: &str,
    region: &str,
  ) -> Self {
    Self {
      street:   street.into(),
      district: district.into(),
      city:     format!("{locality}/{region}"),
    }
  }
}

/// Abstraction over a postal-code lookup service.
pub trait AddressLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up `postal_code`. `Ok(None)` means the service does not know it.
  fn lookup<'a>(
    &'a self,
    postal_code: &'a str,
  ) -> impl Future<Output = Result<Option<AddressInfo>, Self::Error>> + Send + 'a;
}

/// When a postal-code edit should trigger a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupPolicy {
  /// Only look up codes that pass the postal-code format rule. When `false`
  /// any non-empty value is sent to the service.
  pub require_valid_format: bool,
}

impl Default for LookupPolicy {
  fn default() -> Self {
    Self {
      require_valid_format: true,
    }
  }
}

impl LookupPolicy {
  pub fn should_lookup(&self, postal_code: &str) -> bool {
    if postal_code.is_empty() {
      return false;
    }
    !self.require_valid_format || check_postal_code(postal_code).is_ok()
  }
}

/// Look up `postal_code`, collapsing every failure into "not found".
pub async fn resolve_address<L>(lookup: &L, postal_code: &str) -> Option<AddressInfo>
where
  L: AddressLookup + ?Sized,
{
  debug!(postal_code, "looking up address");
  match lookup.lookup(postal_code).await {
    Ok(found) => {
      if found.is_none() {
        debug!(postal_code, "postal code not found");
      }
      found
    }
    Err(e) => {
      warn!(postal_code, error = %e, "address lookup failed");
      None
    }
  }
}
