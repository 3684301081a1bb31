//! Wiring for the `cadastro-server` binary: configuration loading and the
//! top-level router.

use std::path::Path;

use axum::Router;
use cadastro_api::{ApiState, api_router};
use cadastro_cep::{LookupConfig, ViaCepClient};
use cadastro_core::store::MemoryStore;
use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `cadastro.toml` and
/// `CADASTRO_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:   String,
  pub port:   u16,
  /// Install the example record at start-up.
  pub seed:   bool,
  pub lookup: LookupConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:   "127.0.0.1".to_string(),
      port:   8080,
      seed:   true,
      lookup: LookupConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists), then overlay the environment.
  ///
  /// Nested keys use `__`: `CADASTRO_LOOKUP__TIMEOUT_SECS=2`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_file(File::from(path).required(false))
  }

  fn from_file<F>(file: F) -> Result<Self, ConfigError>
  where
    F: Source + Send + Sync + 'static,
  {
    Config::builder()
      .add_source(file)
      .add_source(
        Environment::with_prefix("CADASTRO")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the store, the ViaCEP client and the router, with the API nested
/// under `/api`.
pub fn app(config: &ServerConfig) -> cadastro_cep::Result<Router> {
  let store = if config.seed {
    MemoryStore::seeded()
  } else {
    MemoryStore::default()
  };
  let lookup = ViaCepClient::new(config.lookup.client_config())?;
  info!(
    seed = config.seed,
    lookup_url = %config.lookup.base_url,
    "contact registry ready"
  );

  let state = ApiState::new(store, lookup, config.lookup.policy());
  Ok(
    Router::new()
      .nest("/api", api_router(state))
      .layer(TraceLayer::new_for_http()),
  )
}
