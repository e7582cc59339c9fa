/* src/cli/core/src/dev/mod.rs */

// `sxo dev` command: initial build, dev HTTP server with hot-reload, and the
// watcher/rebuild loop that keeps both in sync (§4.H).

mod bundler;
mod network;
mod watch;

use std::sync::Arc;
use std::path::Path;

use anyhow::{Context, Result};
use sxo_core::{ErrorPages, SubprocessResolver, SxoServer};
use sxo_manifest::{build_manifest, load_manifest, save_manifest};
use tokio::signal;

use crate::config::SxoConfig;
use crate::ui::{self, DIM, GREEN, RED, RESET};

use network::find_available_port;

pub async fn run_dev(config: &SxoConfig, base_dir: &Path) -> Result<()> {
  ui::banner("dev");

  let manifest_path = base_dir.join(&config.build.manifest_path);
  let pages_dir = base_dir.join(&config.build.pages_dir);
  let client_out_dir = base_dir.join(&config.build.out_dir);

  if let Some(bundler_command) = &config.build.bundler_command {
    if !manifest_path.is_file() {
      bundler::run_bundler(bundler_command, base_dir).await?;
    } else {
      ui::detail("existing route manifest found, skipping initial build");
    }
  } else if !manifest_path.is_file() {
    ui::detail("no bundler configured; building route manifest from the page tree");
    let manifest = build_manifest(&pages_dir)
      .with_context(|| format!("failed to walk {}", pages_dir.display()))?;
    save_manifest(&manifest_path, &manifest)
      .with_context(|| format!("failed to write {}", manifest_path.display()))?;
  }

  let manifest = load_manifest(&manifest_path)
    .with_context(|| format!("failed to read {}", manifest_path.display()))?;

  let render_command = config
    .build
    .render_command
    .as_ref()
    .context("build.render_command must be set in sxo.toml to run the dev server")?;
  let resolver =
    SubprocessResolver { command: render_command.clone(), project_root: base_dir.to_path_buf() };

  let parts = SxoServer::new(manifest, Arc::new(resolver))
    .public_path(config.build.public_path.clone())
    .return_error_stub(true)
    .error_pages(ErrorPages {
      not_found: config.pages.not_found.clone(),
      server_error: config.pages.error.clone(),
    })
    .into_parts();

  let (router, state, sse_hub) =
    sxo_axum::dev_server(parts, client_out_dir.clone(), config.dev.hot_replace_path.clone());

  let port = find_available_port(config.dev.port)?;
  let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
    .await
    .with_context(|| format!("failed to bind to port {port}"))?;

  ui::ok(&format!("listening on http://localhost:{port}"));
  ui::detail(&format!("watching {}", pages_dir.display()));
  println!();

  let mut source_watch = watch::watch_dir(&pages_dir)?;
  let mut output_watch = watch::watch_dir(&client_out_dir).ok();

  let serve_future = std::future::IntoFuture::into_future(axum::serve(listener, router));
  tokio::pin!(serve_future);

  loop {
    tokio::select! {
      _ = signal::ctrl_c() => {
        println!();
        println!("  {DIM}shutting down...{RESET}");
        break;
      }
      result = &mut serve_future => {
        result.context("dev server exited unexpectedly")?;
        break;
      }
      Some(paths) = source_watch.rx.recv() => {
        watch::debounce(&mut source_watch.rx, paths).await;
        if let Some(bundler_command) = &config.build.bundler_command {
          match bundler::run_bundler(bundler_command, base_dir).await {
            Ok(()) => {}
            Err(err) => println!("  {RED}[sxo]{RESET} {err}"),
          }
        }
      }
      Some(paths) = async {
        match output_watch.as_mut() {
          Some(w) => w.rx.recv().await,
          None => std::future::pending::<Option<Vec<std::path::PathBuf>>>().await,
        }
      } => {
        let changed = match output_watch.as_mut() {
          Some(w) => watch::debounce(&mut w.rx, paths).await,
          None => Vec::new(),
        };
        on_output_changed(&state, &sse_hub, &manifest_path, &changed).await;
      }
    }
  }

  Ok(())
}

/// Output directory changed: bust the module cache, reload the manifest
/// (the bundler may have rewritten filenames/assets), and tell connected
/// browsers to refresh (§4.H.2, §5).
async fn on_output_changed(
  state: &Arc<sxo_axum::DevState>,
  sse_hub: &Arc<sxo_axum::SseHub>,
  manifest_path: &Path,
  changed_paths: &[String],
) {
  state.loader.clear();
  match load_manifest(manifest_path) {
    Ok(fresh) => {
      *state.manifest.write().expect("manifest lock poisoned") = fresh;
    }
    Err(err) => {
      println!("  {RED}[sxo]{RESET} failed to reload manifest: {err}");
    }
  }
  println!("  {GREEN}[sxo]{RESET} hot-reload broadcast ({} changed)", changed_paths.len());
  sse_hub.broadcast(changed_paths);
}
