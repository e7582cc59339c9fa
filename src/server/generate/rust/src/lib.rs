/* src/server/generate/rust/src/lib.rs */

//! Static site generation (4.G): loads server-rendered page modules for
//! every static route, applies the managed head block and client assets,
//! writes idempotent HTML outputs, and records `generated: true` on the
//! manifest entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sxo_core::ModuleLoader;
use sxo_manifest::{load_manifest, save_manifest, Manifest, ManifestError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),
  #[error("io error writing `{path}`: {source}")]
  Io { path: String, source: std::io::Error },
}

/// Summary returned by a generator run; the CLI uses `failed` to compute the
/// process exit code (§4.G, §6 "generator exits 0 on success").
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
  pub generated: usize,
  pub skipped: usize,
  pub failed: usize,
  pub failures: Vec<(String, String)>,
  pub message: Option<String>,
}

/// Run one static-generation pass.
///
/// `project_root` resolves each route's `source` against the project's
/// on-disk layout (the same root a `source` path is relative to);
/// `client_out_dir` is where generated HTML files and assets live;
/// `public_path` prefixes injected asset hrefs (4.D).
pub async fn generate(
  manifest_path: &Path,
  client_out_dir: &Path,
  public_path: &str,
  loader: &Arc<ModuleLoader>,
) -> Result<GenerateSummary, GenerateError> {
  let mut manifest: Manifest = load_manifest(manifest_path)?;

  let static_indices: Vec<usize> =
    manifest.iter().enumerate().filter(|(_, d)| !d.is_dynamic()).map(|(i, _)| i).collect();

  if static_indices.is_empty() {
    tracing::info!("no static routes to generate");
    return Ok(GenerateSummary {
      message: Some("No static routes to generate".to_string()),
      ..Default::default()
    });
  }

  let mut summary = GenerateSummary::default();
  let empty_params: HashMap<String, String> = HashMap::new();

  for index in static_indices {
    let (source, filename, css, js, already_generated) = {
      let route = &manifest[index];
      (route.source.clone(), route.filename.clone(), route.assets.css.clone(), route.assets.js.clone(), route.generated)
    };
    let dest = client_out_dir.join(&filename);

    if already_generated && dest.is_file() {
      summary.skipped += 1;
      tracing::debug!(route = %filename, "skipped (already generated)");
      continue;
    }

    match generate_one(&source, &dest, public_path, &css, &js, loader, &empty_params).await {
      Ok(()) => {
        manifest[index].generated = true;
        summary.generated += 1;
        tracing::debug!(route = %filename, "generated");
      }
      Err(reason) => {
        summary.failed += 1;
        summary.failures.push((filename.clone(), reason.clone()));
        tracing::debug!(route = %filename, error = %reason, "failed");
      }
    }
  }

  save_manifest(manifest_path, &manifest).map_err(GenerateError::Manifest)?;

  tracing::info!(
    generated = summary.generated,
    skipped = summary.skipped,
    failed = summary.failed,
    "generation complete"
  );

  Ok(summary)
}

async fn generate_one(
  source: &str,
  dest: &Path,
  public_path: &str,
  css: &[String],
  js: &[String],
  loader: &Arc<ModuleLoader>,
  params: &HashMap<String, String>,
) -> Result<(), String> {
  let module = loader.load(source, false).await.map_err(|e| e.to_string())?;

  let rendered = module.render(params).await.map_err(|e| e.to_string())?;
  if !rendered.contains("<html") {
    return Err(format!("render output for `{source}` does not contain an <html> tag"));
  }

  let head_export = module.head(params).await;
  let with_head = sxo_render::apply_head(&rendered, head_export.as_ref());
  let with_assets = sxo_render::inject_assets(&with_head, css, js, public_path);
  let html = ensure_doctype(with_assets);

  write_atomically(dest, &html).map_err(|e| e.to_string())?;
  Ok(())
}

fn ensure_doctype(html: String) -> String {
  let trimmed = html.trim_start();
  if trimmed.len() >= 9 && trimmed[..9].eq_ignore_ascii_case("<!doctype") {
    html
  } else {
    format!("<!doctype html>{html}")
  }
}

/// Write-then-rename so a generated file never appears partially written
/// (3. "Lifecycles": "write-then-rename semantics preferred").
fn write_atomically(dest: &Path, contents: &str) -> std::io::Result<()> {
  if let Some(parent) = dest.parent() {
    std::fs::create_dir_all(parent)?;
  }
  let tmp = dest.with_extension("tmp-sxo-write");
  std::fs::write(&tmp, contents)?;
  std::fs::rename(&tmp, dest)?;
  Ok(())
}

/// Resolve a route descriptor's `filename` against the client output
/// directory, as used by both the generator and the prod handler's
/// generated-route fast path.
pub fn output_path(client_out_dir: &Path, filename: &str) -> PathBuf {
  client_out_dir.join(filename)
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_core::future::BoxFuture;
  use serde_json::Value;
  use sxo_core::{InMemoryResolver, ModuleLoadError, PageModule};
  use sxo_manifest::{Assets, RouteDescriptor, Segment};

  struct FixedPage(&'static str);
  impl PageModule for FixedPage {
    fn render<'a>(
      &'a self,
      _params: &'a HashMap<String, String>,
    ) -> BoxFuture<'a, Result<String, ModuleLoadError>> {
      let body = self.0.to_string();
      Box::pin(async move { Ok(body) })
    }
    fn head<'a>(&'a self, _params: &'a HashMap<String, String>) -> BoxFuture<'a, Option<Value>> {
      Box::pin(async { None })
    }
  }

  fn route(path: &str, segments: Vec<Segment>, source: &str) -> RouteDescriptor {
    RouteDescriptor {
      path: path.into(),
      segments,
      filename: if path.is_empty() { "index.html".into() } else { format!("{path}/index.html") },
      source: source.into(),
      assets: Assets::default(),
      generated: false,
    }
  }

  fn write_manifest(dir: &Path, manifest: &Manifest) -> PathBuf {
    let path = dir.join("route-manifest.json");
    save_manifest(&path, manifest).unwrap();
    path
  }

  #[tokio::test]
  async fn generates_static_route_and_marks_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("client");
    let manifest = vec![route("", vec![], "src/pages/index.tsx")];
    let manifest_path = write_manifest(dir.path(), &manifest);

    let resolver =
      InMemoryResolver::new().register("src/pages/index.tsx", Arc::new(FixedPage("<html><body>hi</body></html>")));
    let loader = Arc::new(ModuleLoader::new(Arc::new(resolver), false));

    let summary = generate(&manifest_path, &out_dir, "/", &loader).await.unwrap();
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.failed, 0);

    let written = std::fs::read_to_string(out_dir.join("index.html")).unwrap();
    assert!(written.starts_with("<!doctype html>"));

    let reloaded = load_manifest(&manifest_path).unwrap();
    assert!(reloaded[0].generated);
  }

  #[tokio::test]
  async fn second_run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("client");
    let manifest = vec![route("", vec![], "src/pages/index.tsx")];
    let manifest_path = write_manifest(dir.path(), &manifest);

    let resolver =
      InMemoryResolver::new().register("src/pages/index.tsx", Arc::new(FixedPage("<html></html>")));
    let loader = Arc::new(ModuleLoader::new(Arc::new(resolver), false));

    generate(&manifest_path, &out_dir, "/", &loader).await.unwrap();
    let second = generate(&manifest_path, &out_dir, "/", &loader).await.unwrap();
    assert_eq!(second, GenerateSummary { generated: 0, skipped: 1, failed: 0, failures: vec![], message: None });
  }

  #[tokio::test]
  async fn dynamic_only_manifest_reports_no_static_routes() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("client");
    let manifest = vec![route(
      "blog/[slug]",
      vec![Segment::Literal("blog".into()), Segment::Param("slug".into())],
      "src/pages/blog/[slug]/page.tsx",
    )];
    let manifest_path = write_manifest(dir.path(), &manifest);
    let loader = Arc::new(ModuleLoader::new(Arc::new(InMemoryResolver::new()), false));

    let summary = generate(&manifest_path, &out_dir, "/", &loader).await.unwrap();
    assert_eq!(summary.message.as_deref(), Some("No static routes to generate"));
    assert!(!out_dir.join("blog").exists());
  }

  #[tokio::test]
  async fn missing_render_export_counts_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("client");
    let manifest = vec![route("", vec![], "src/pages/missing.tsx")];
    let manifest_path = write_manifest(dir.path(), &manifest);
    let loader = Arc::new(ModuleLoader::new(Arc::new(InMemoryResolver::new()), false));

    let summary = generate(&manifest_path, &out_dir, "/", &loader).await.unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.generated, 0);
  }

  #[tokio::test]
  async fn render_without_html_tag_counts_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("client");
    let manifest = vec![route("", vec![], "src/pages/index.tsx")];
    let manifest_path = write_manifest(dir.path(), &manifest);
    let resolver = InMemoryResolver::new().register("src/pages/index.tsx", Arc::new(FixedPage("not html")));
    let loader = Arc::new(ModuleLoader::new(Arc::new(resolver), false));

    let summary = generate(&manifest_path, &out_dir, "/", &loader).await.unwrap();
    assert_eq!(summary.failed, 1);
  }
}
