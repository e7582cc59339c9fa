/* src/cli/core/src/main.rs */

mod clean;
mod config;
mod dev;
mod generate;
mod shell;
mod start;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::{find_sxo_config, load_sxo_config, SxoConfig};

#[derive(Parser)]
#[command(name = "sxo", about = "SXO CLI")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Generate static HTML for every static route in the manifest
  Generate {
    /// Path to sxo.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Start the dev server with hot reload
  Dev {
    /// Path to sxo.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Serve the generated site and render dynamic routes on demand
  Start {
    /// Path to sxo.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Remove build output and the route manifest, run cleanup commands
  Clean {
    /// Path to sxo.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

/// Resolve config path (explicit or auto-detected) and parse it.
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, SxoConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_sxo_config(&cwd)?
    }
  };
  let config = load_sxo_config(&path)?;
  Ok((path, config))
}

fn init_tracing() {
  let filter = tracing_subscriber::EnvFilter::try_from_env("SXO_LOG")
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  match cli.command {
    Command::Generate { config } => {
      let (config_path, sxo_config) = resolve_config(config)?;
      let base_dir = config_path.parent().unwrap_or_else(|| std::path::Path::new("."));
      generate::run_generate(&sxo_config, base_dir).await?;
    }
    Command::Dev { config } => {
      let (config_path, sxo_config) = resolve_config(config)?;
      let base_dir = config_path.parent().unwrap_or_else(|| std::path::Path::new("."));
      dev::run_dev(&sxo_config, base_dir).await?;
    }
    Command::Start { config } => {
      let (config_path, sxo_config) = resolve_config(config)?;
      let base_dir = config_path.parent().unwrap_or_else(|| std::path::Path::new("."));
      start::run_start(&sxo_config, base_dir).await?;
    }
    Command::Clean { config } => {
      let (config_path, sxo_config) = resolve_config(config)?;
      let base_dir = config_path.parent().unwrap_or_else(|| std::path::Path::new("."));
      clean::run_clean(&sxo_config, base_dir)?;
    }
  }

  Ok(())
}
