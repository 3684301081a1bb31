//! `cadastro` — terminal UI for the contact registry.
//!
//! # Usage
//!
//! ```
//! cadastro
//! cadastro --lookup-url http://localhost:3999 --timeout-secs 2 --no-seed
//! cadastro --config ~/.config/cadastro/cadastro.toml --log-file /tmp/cadastro.log
//! ```

mod app;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use cadastro_cep::{LookupConfig, ViaCepClient};
use cadastro_core::store::MemoryStore;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cadastro", about = "Terminal UI for the contact registry")]
struct Args {
  /// Path to a TOML config file (`seed`, `[lookup]`).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the CEP lookup service (default: https://viacep.com.br).
  #[arg(long, env = "CADASTRO_LOOKUP_URL")]
  lookup_url: Option<String>,

  /// Lookup request timeout in seconds.
  #[arg(long)]
  timeout_secs: Option<u64>,

  /// Start with an empty registry instead of the example record.
  #[arg(long)]
  no_seed: bool,

  /// Write logs to this file. Nothing is logged otherwise.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Debug)]
#[serde(default)]
struct ConfigFile {
  seed:   bool,
  lookup: LookupConfig,
}

impl Default for ConfigFile {
  fn default() -> Self {
    Self {
      seed:   true,
      lookup: LookupConfig::default(),
    }
  }
}

impl ConfigFile {
  fn read(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }

  /// CLI flags override the file, which overrides defaults.
  fn merge(mut self, args: &Args) -> Self {
    if let Some(url) = &args.lookup_url {
      self.lookup.base_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
      self.lookup.timeout_secs = secs;
    }
    if args.no_seed {
      self.seed = false;
    }
    self
  }
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Log to `path` only: anything written to the terminal would tear the UI.
fn init_logging(path: &Path) -> Result<()> {
  let file = File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  let settings = match &args.config {
    Some(path) => ConfigFile::read(path)?,
    None => ConfigFile::default(),
  }
  .merge(&args);

  let lookup = ViaCepClient::new(settings.lookup.client_config())
    .context("building lookup client")?;
  let store = if settings.seed {
    MemoryStore::seeded()
  } else {
    MemoryStore::default()
  };
  let mut app = App::new(store, lookup, settings.lookup.policy());
  app.refresh().await?;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ViaCepClient>,
) -> Result<()> {
  loop {
    app.drain_lookups();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
