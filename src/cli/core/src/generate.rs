/* src/cli/core/src/generate.rs */

// `sxo generate` command: static-site generation over the route manifest (§4.G).

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use sxo_core::{ModuleLoader, SubprocessResolver};
use sxo_manifest::{build_manifest, save_manifest};

use crate::config::SxoConfig;
use crate::ui;

pub async fn run_generate(config: &SxoConfig, base_dir: &Path) -> Result<()> {
  ui::arrow("generating static routes");

  let manifest_path = base_dir.join(&config.build.manifest_path);
  if !manifest_path.is_file() {
    ui::detail("no manifest found, building one from the page tree");
    let pages_dir = base_dir.join(&config.build.pages_dir);
    let manifest = build_manifest(&pages_dir)
      .with_context(|| format!("failed to walk {}", pages_dir.display()))?;
    save_manifest(&manifest_path, &manifest)
      .with_context(|| format!("failed to write {}", manifest_path.display()))?;
  }

  let render_command = config
    .build
    .render_command
    .as_ref()
    .context("build.render_command must be set in sxo.toml to generate pages")?;

  let resolver =
    SubprocessResolver { command: render_command.clone(), project_root: base_dir.to_path_buf() };
  let loader = Arc::new(ModuleLoader::new(Arc::new(resolver), false));

  let client_out_dir = base_dir.join(&config.build.out_dir);
  let summary =
    sxo_generate::generate(&manifest_path, &client_out_dir, &config.build.public_path, &loader)
      .await
      .context("generation failed")?;

  if let Some(message) = &summary.message {
    ui::detail(message);
  }
  ui::ok(&format!(
    "{} generated, {} skipped, {} failed",
    summary.generated, summary.skipped, summary.failed
  ));
  for (route, reason) in &summary.failures {
    ui::warn(&format!("{route}: {reason}"));
  }

  if summary.failed > 0 {
    bail!("{} route(s) failed to generate", summary.failed);
  }
  Ok(())
}
