/* src/cli/core/src/clean.rs */

// `sxo clean` command: removes build output and runs user-defined cleanup commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::SxoConfig;
use crate::shell::run_command;
use crate::ui;

/// Run `sxo clean` for the project rooted at `base_dir`.
pub fn run_clean(config: &SxoConfig, base_dir: &Path) -> Result<()> {
  ui::arrow("cleaning project");

  delete_out_dir(config, base_dir)?;
  delete_manifest(config, base_dir)?;
  run_clean_commands(&config.clean.commands, base_dir)?;

  ui::ok("clean complete");
  Ok(())
}

/// Delete the build output directory.
fn delete_out_dir(config: &SxoConfig, base_dir: &Path) -> Result<()> {
  let path = base_dir.join(&config.build.out_dir);
  delete_dir_if_exists(&path)
}

/// Delete the route manifest file.
fn delete_manifest(config: &SxoConfig, base_dir: &Path) -> Result<()> {
  let path = base_dir.join(&config.build.manifest_path);
  if path.exists() {
    std::fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    ui::detail(&format!("deleted {}", path.display()));
  }
  Ok(())
}

fn delete_dir_if_exists(path: &Path) -> Result<()> {
  if path.exists() {
    std::fs::remove_dir_all(path)
      .with_context(|| format!("failed to remove {}", path.display()))?;
    ui::detail(&format!("deleted {}", path.display()));
  }
  Ok(())
}

fn run_clean_commands(commands: &[String], cwd: &Path) -> Result<()> {
  for cmd in commands {
    run_command(cwd, cmd, "clean", &[])?;
  }
  Ok(())
}
