/* src/server/core/rust/src/loader.rs */

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, RwLock};

use futures_core::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error, Clone)]
pub enum ModuleLoadError {
  #[error("no render export found in `{0}`")]
  NoRenderExport(String),
  #[error("failed to resolve `{source}`: {reason}")]
  ResolveFailed { source: String, reason: String },
  #[error("render failed for `{source}`: {reason}")]
  RenderFailed { source: String, reason: String },
}

/// A loaded rendering module: a default render callable plus an optional
/// `head` export, both keyed on the route's captured params.
pub trait PageModule: Send + Sync {
  fn render<'a>(
    &'a self,
    params: &'a HashMap<String, String>,
  ) -> BoxFuture<'a, Result<String, ModuleLoadError>>;

  /// Invoke the module's `head` export. A throwing/failing export is
  /// swallowed here, not surfaced as an error (4.C: "if invocation throws,
  /// silently return the cleaned HTML").
  fn head<'a>(&'a self, params: &'a HashMap<String, String>) -> BoxFuture<'a, Option<Value>>;
}

/// Resolves a route descriptor's `source` reference into a loaded module.
/// The JSX bundler is an external collaborator (out of scope); this is the
/// seam through which this crate stays ignorant of how `source` is actually
/// compiled or executed.
pub trait RenderModuleResolver: Send + Sync {
  fn resolve<'a>(
    &'a self,
    source: &'a str,
  ) -> BoxFuture<'a, Result<Arc<dyn PageModule>, ModuleLoadError>>;
}

/// A render module that always fails, replayed at request time as the
/// dev-only error page (4.E / §7 "Module load errors").
pub struct ErrorStubModule {
  source: String,
  reason: String,
}

impl ErrorStubModule {
  pub fn new(source: impl Into<String>, reason: impl Into<String>) -> Self {
    ErrorStubModule { source: source.into(), reason: reason.into() }
  }
}

impl PageModule for ErrorStubModule {
  fn render<'a>(
    &'a self,
    _params: &'a HashMap<String, String>,
  ) -> BoxFuture<'a, Result<String, ModuleLoadError>> {
    let html = format!(
      "<!doctype html><html><head><title>Module load error</title></head><body>\
       <h1>Failed to load {}</h1><pre>{}</pre></body></html>",
      sxo_render::helpers::escape_html(&self.source),
      sxo_render::helpers::escape_html(&self.reason),
    );
    Box::pin(async move { Ok(html) })
  }

  fn head<'a>(&'a self, _params: &'a HashMap<String, String>) -> BoxFuture<'a, Option<Value>> {
    Box::pin(async { None })
  }
}

/// Resolves a module by invoking the project's configured render-entry
/// command as a subprocess: `{command} {source} {params_json}`. The HTML
/// document is read from stdout; an optional head export is read from the
/// first line of stderr when it starts with the `SXO_HEAD_JSON:` marker
/// (everything else on stderr is passed through as log noise).
pub struct SubprocessResolver {
  pub command: String,
  pub project_root: std::path::PathBuf,
}

struct SubprocessPageModule {
  command: String,
  project_root: std::path::PathBuf,
  source: String,
}

const HEAD_MARKER: &str = "SXO_HEAD_JSON:";

impl PageModule for SubprocessPageModule {
  fn render<'a>(
    &'a self,
    params: &'a HashMap<String, String>,
  ) -> BoxFuture<'a, Result<String, ModuleLoadError>> {
    Box::pin(async move {
      let params_json = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
      let invocation = format!("{} {}", self.command, shell_quote(&self.source));
      let mut child = Command::new("sh")
        .arg("-c")
        .arg(&invocation)
        .current_dir(&self.project_root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ModuleLoadError::ResolveFailed { source: self.source.clone(), reason: e.to_string() })?;

      if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(params_json.as_bytes()).await;
      }

      let output = child
        .wait_with_output()
        .await
        .map_err(|e| ModuleLoadError::RenderFailed { source: self.source.clone(), reason: e.to_string() })?;

      if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ModuleLoadError::RenderFailed {
          source: self.source.clone(),
          reason: strip_tool_prefix(&stderr),
        });
      }

      Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    })
  }

  fn head<'a>(&'a self, params: &'a HashMap<String, String>) -> BoxFuture<'a, Option<Value>> {
    Box::pin(async move {
      let params_json = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
      let invocation = format!("{} {}", self.command, shell_quote(&self.source));
      let mut child = Command::new("sh")
        .arg("-c")
        .arg(&invocation)
        .current_dir(&self.project_root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .ok()?;
      if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(params_json.as_bytes()).await;
      }
      let output = child.wait_with_output().await.ok()?;
      let stderr = String::from_utf8_lossy(&output.stderr);
      let first_line = stderr.lines().next()?;
      let payload = first_line.strip_prefix(HEAD_MARKER)?;
      serde_json::from_str(payload).ok()
    })
  }
}

fn shell_quote(s: &str) -> String {
  format!("'{}'", s.replace('\'', "'\\''"))
}

/// Strip a bundler's tool-specific log prefix (e.g. `[vite] `, `error: `)
/// from the first line of a rebuild/render failure so the logged message
/// reads as plain English (4.H.1).
fn strip_tool_prefix(message: &str) -> String {
  let first_line = message.lines().next().unwrap_or(message);
  let trimmed = first_line.trim();
  for prefix in ["error:", "Error:", "ERROR:"] {
    if let Some(rest) = trimmed.strip_prefix(prefix) {
      return rest.trim().to_string();
    }
  }
  if let Some(end) = trimmed.find(']') {
    if trimmed.starts_with('[') {
      return trimmed[end + 1..].trim().to_string();
    }
  }
  trimmed.to_string()
}

impl RenderModuleResolver for SubprocessResolver {
  fn resolve<'a>(
    &'a self,
    source: &'a str,
  ) -> BoxFuture<'a, Result<Arc<dyn PageModule>, ModuleLoadError>> {
    Box::pin(async move {
      let module: Arc<dyn PageModule> = Arc::new(SubprocessPageModule {
        command: self.command.clone(),
        project_root: self.project_root.clone(),
        source: source.to_string(),
      });
      Ok(module)
    })
  }
}

/// An in-memory resolver for tests and the generator's dry-run paths: pages
/// are registered ahead of time rather than resolved via a subprocess.
#[derive(Default)]
pub struct InMemoryResolver {
  pages: HashMap<String, Arc<dyn PageModule>>,
}

impl InMemoryResolver {
  pub fn new() -> Self {
    InMemoryResolver { pages: HashMap::new() }
  }

  pub fn register(mut self, source: impl Into<String>, module: Arc<dyn PageModule>) -> Self {
    self.pages.insert(source.into(), module);
    self
  }
}

impl RenderModuleResolver for InMemoryResolver {
  fn resolve<'a>(
    &'a self,
    source: &'a str,
  ) -> BoxFuture<'a, Result<Arc<dyn PageModule>, ModuleLoadError>> {
    Box::pin(async move {
      self
        .pages
        .get(source)
        .cloned()
        .ok_or_else(|| ModuleLoadError::NoRenderExport(source.to_string()))
    })
  }
}

/// Caches loaded modules by source reference (4.E). Shared by the dev
/// server so routes stay memoised until invalidated by a source change;
/// the generator and prod handler use it as an effectively read-once cache.
pub struct ModuleLoader {
  resolver: Arc<dyn RenderModuleResolver>,
  cache: RwLock<HashMap<String, Arc<dyn PageModule>>>,
  return_error_stub: bool,
}

impl ModuleLoader {
  pub fn new(resolver: Arc<dyn RenderModuleResolver>, return_error_stub: bool) -> Self {
    ModuleLoader { resolver, cache: RwLock::new(HashMap::new()), return_error_stub }
  }

  /// Load the module for `source`, optionally busting any cached version
  /// first. When `return_error_stub` is set, a resolve failure yields an
  /// `ErrorStubModule` instead of propagating the error (dev mode); prod and
  /// the generator run with it unset so failures surface as errors.
  pub async fn load(&self, source: &str, bust_cache: bool) -> Result<Arc<dyn PageModule>, ModuleLoadError> {
    if bust_cache {
      self.cache.write().expect("module cache lock poisoned").remove(source);
    }
    if let Some(hit) = self.cache.read().expect("module cache lock poisoned").get(source).cloned() {
      return Ok(hit);
    }

    match self.resolver.resolve(source).await {
      Ok(module) => {
        self.cache.write().expect("module cache lock poisoned").insert(source.to_string(), module.clone());
        Ok(module)
      }
      Err(err) => {
        tracing::warn!(source, error = %err, "module load failed");
        if self.return_error_stub {
          Ok(Arc::new(ErrorStubModule::new(source, err.to_string())))
        } else {
          Err(err)
        }
      }
    }
  }

  /// Empty the cache (dev: called on output-directory change).
  pub fn clear(&self) {
    self.cache.write().expect("module cache lock poisoned").clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct StaticModule(&'static str);
  impl PageModule for StaticModule {
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

  #[tokio::test]
  async fn caches_across_loads() {
    let resolver = InMemoryResolver::new().register("a.tsx", Arc::new(StaticModule("one")));
    let loader = ModuleLoader::new(Arc::new(resolver), false);
    let first = loader.load("a.tsx", false).await.unwrap();
    let params = HashMap::new();
    assert_eq!(first.render(&params).await.unwrap(), "one");
    // Same cached instance returned; Arc pointer equality proves no re-resolve.
    let second = loader.load("a.tsx", false).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
  }

  #[tokio::test]
  async fn bust_cache_forces_reresolve() {
    let resolver = InMemoryResolver::new().register("a.tsx", Arc::new(StaticModule("one")));
    let loader = ModuleLoader::new(Arc::new(resolver), false);
    let first = loader.load("a.tsx", false).await.unwrap();
    let second = loader.load("a.tsx", true).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
  }

  #[tokio::test]
  async fn missing_module_without_error_stub_propagates() {
    let loader = ModuleLoader::new(Arc::new(InMemoryResolver::new()), false);
    let result = loader.load("missing.tsx", false).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn missing_module_with_error_stub_returns_dev_page() {
    let loader = ModuleLoader::new(Arc::new(InMemoryResolver::new()), true);
    let module = loader.load("missing.tsx", false).await.unwrap();
    let params = HashMap::new();
    let html = module.render(&params).await.unwrap();
    assert!(html.contains("Failed to load"));
  }

  #[tokio::test]
  async fn clear_drops_cached_entries() {
    let resolver = InMemoryResolver::new().register("a.tsx", Arc::new(StaticModule("one")));
    let loader = ModuleLoader::new(Arc::new(resolver), false);
    let first = loader.load("a.tsx", false).await.unwrap();
    loader.clear();
    let second = loader.load("a.tsx", false).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
  }

  #[test]
  fn strip_tool_prefix_removes_bracketed_label() {
    assert_eq!(strip_tool_prefix("[vite] build failed\nmore"), "build failed");
    assert_eq!(strip_tool_prefix("error: unexpected token"), "unexpected token");
  }
}
