/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::SxoConfig;

/// Walk upward from `start` to find `sxo.toml`, like Cargo.toml discovery.
pub fn find_sxo_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join("sxo.toml");
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("sxo.toml not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_sxo_config(path: &Path) -> Result<SxoConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let mut config: SxoConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  apply_env_overrides(&mut config);
  Ok(config)
}

/// Environment overrides applied after file load (§6): `PORT` and
/// `PUBLIC_PATH` take precedence over `sxo.toml` values.
fn apply_env_overrides(config: &mut SxoConfig) {
  if let Ok(port) = std::env::var("PORT") {
    if let Ok(port) = port.parse() {
      config.dev.port = port;
    }
  }
  if let Ok(public_path) = std::env::var("PUBLIC_PATH") {
    config.build.public_path = public_path;
  }
}
