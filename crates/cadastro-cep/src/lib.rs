//! ViaCEP backend for [`cadastro_core::lookup::AddressLookup`].
//!
//! `GET {base_url}/ws/{cep}/json/` answers either an address payload or
//! `{"erro": true}` for unknown codes. The latter maps to `Ok(None)`; any
//! transport failure, timeout or non-success status is an [`Error`].

pub mod error;

pub use error::{Error, Result};

use std::{future::Future, time::Duration};

use cadastro_core::lookup::{AddressInfo, AddressLookup, LookupPolicy};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

// ─── Configuration ───────────────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br";

/// Connection settings for the lookup service.
#[derive(Debug, Clone)]
pub struct ViaCepConfig {
  pub base_url: String,
  /// Whole-request timeout; an expired request counts as a failure.
  pub timeout:  Duration,
}

impl Default for ViaCepConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout:  Duration::from_secs(5),
    }
  }
}

/// The `[lookup]` table shared by the server and TUI configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
  pub base_url:             String,
  pub timeout_secs:         u64,
  pub require_valid_format: bool,
}

impl Default for LookupConfig {
  fn default() -> Self {
    Self {
      base_url:             DEFAULT_BASE_URL.to_string(),
      timeout_secs:         5,
      require_valid_format: LookupPolicy::default().require_valid_format,
    }
  }
}

impl LookupConfig {
  pub fn client_config(&self) -> ViaCepConfig {
    ViaCepConfig {
      base_url: self.base_url.clone(),
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }

  pub fn policy(&self) -> LookupPolicy {
    LookupPolicy {
      require_valid_format: self.require_valid_format,
    }
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Payload {
  #[serde(default)]
  logradouro: String,
  #[serde(default)]
  bairro:     String,
  #[serde(default)]
  localidade: String,
  #[serde(default)]
  uf:         String,
  /// `true` (or the string `"true"`) for unknown postal codes.
  #[serde(default)]
  erro:       Option<serde_json::Value>,
}

impl Payload {
  fn is_miss(&self) -> bool {
    match &self.erro {
      Some(serde_json::Value::Bool(flag)) => *flag,
      Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
      _ => false,
    }
  }

  fn into_address(self) -> Option<AddressInfo> {
    if self.is_miss() {
      return None;
    }
    Some(AddressInfo::new(
      self.logradouro,
      self.bairro,
      &self.localidade,
      &self.uf,
    ))
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async ViaCEP client.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
  client:   Client,
  base_url: Url,
}

impl ViaCepClient {
  pub fn new(config: ViaCepConfig) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)
      .ok()
      .filter(|url| !url.cannot_be_a_base())
      .ok_or_else(|| Error::BaseUrl(config.base_url.clone()))?;
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, base_url })
  }

  /// `{base}/ws/{postal_code}/json/`, with the code escaped as a single path
  /// segment.
  fn url(&self, postal_code: &str) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|()| Error::BaseUrl(self.base_url.to_string()))?
      .pop_if_empty()
      .extend(["ws", postal_code, "json", ""]);
    Ok(url)
  }

  /// Fetch the address for `postal_code`; `Ok(None)` when ViaCEP reports
  /// the code as unknown.
  pub async fn fetch(&self, postal_code: &str) -> Result<Option<AddressInfo>> {
    let url = self.url(postal_code)?;
    debug!(%url, "GET viacep");
    let resp = self.client.get(url).send().await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    let payload: Payload = resp.json().await?;
    Ok(payload.into_address())
  }
}

impl AddressLookup for ViaCepClient {
  type Error = Error;

  fn lookup<'a>(
    &'a self,
    postal_code: &'a str,
  ) -> impl Future<Output = Result<Option<AddressInfo>>> + Send + 'a {
    self.fetch(postal_code)
  }
}
