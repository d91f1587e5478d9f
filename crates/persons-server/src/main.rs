//! persons-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `PERSONS_*`
//! environment variables, connects to the index cluster, and serves the
//! persons API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use persons_core::{codec::IsoLocalDateTime, mapping::PersonMapping, memory::MemoryIndex};
use persons_store_opensearch::OpenSearchStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Persons search-index API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Keep documents in process memory instead of connecting to a cluster.
  #[arg(long)]
  in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = persons_server::load_config(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let mapping = PersonMapping::new(&server_cfg.index_name, Arc::new(IsoLocalDateTime));

  if cli.in_memory {
    tracing::warn!("serving from process memory; documents are lost on exit");
    return persons_server::serve(MemoryIndex::new(mapping), &server_cfg).await;
  }

  let store = OpenSearchStore::connect(&server_cfg.index_url, mapping)
    .with_context(|| format!("invalid index endpoint {:?}", server_cfg.index_url))?;

  persons_server::serve(store, &server_cfg).await
}
