/* src/cli/core/src/start.rs */

// `sxo start` command: serves the generated site and renders dynamic
// routes on demand, with no watcher and no module cache busting (§4.I).

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sxo_core::{ErrorPages, SubprocessResolver, SxoServer};
use sxo_manifest::load_manifest;

use crate::config::SxoConfig;
use crate::ui;

pub async fn run_start(config: &SxoConfig, base_dir: &Path) -> Result<()> {
  ui::banner("start");

  let manifest_path = base_dir.join(&config.build.manifest_path);
  let manifest = load_manifest(&manifest_path)
    .with_context(|| format!("failed to read {}", manifest_path.display()))?;

  let render_command = config
    .build
    .render_command
    .as_ref()
    .context("build.render_command must be set in sxo.toml to serve dynamic routes")?;
  let resolver =
    SubprocessResolver { command: render_command.clone(), project_root: base_dir.to_path_buf() };

  let parts = SxoServer::new(manifest, Arc::new(resolver))
    .public_path(config.build.public_path.clone())
    .return_error_stub(false)
    .error_pages(ErrorPages {
      not_found: config.pages.not_found.clone(),
      server_error: config.pages.error.clone(),
    })
    .into_parts();

  let client_out_dir = base_dir.join(&config.build.out_dir);
  let router = sxo_axum::prod_server(parts, client_out_dir);

  let port = config.dev.port;
  let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
    .await
    .with_context(|| format!("failed to bind to port {port}"))?;

  ui::ok(&format!("listening on http://localhost:{port}"));
  println!();

  axum::serve(listener, router).await.context("server exited unexpectedly")
}
