//! cadastro-server binary.
//!
//! Reads `cadastro.toml` (or the path given with `--config`), builds an
//! in-memory contact store and serves the JSON API under `/api`.

use std::path::PathBuf;

use anyhow::Context as _;
use cadastro_server::{ServerConfig, app};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cadastro contact registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cadastro.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to read config from {:?}", cli.config))?;

  let router = app(&server_cfg).context("failed to build lookup client")?;
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, router).await.context("server error")?;

  Ok(())
}
