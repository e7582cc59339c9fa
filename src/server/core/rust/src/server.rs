/* src/server/core/rust/src/server.rs */

use std::sync::Arc;

use http::HeaderMap;
use sxo_manifest::Manifest;

use crate::loader::{ModuleLoader, RenderModuleResolver};
use crate::middleware::{Fetchware, Middleware};

/// Optional user-supplied 404/500 page overrides, each a source reference
/// resolved through the same `ModuleLoader` as ordinary pages (§7: "HTML
/// from user 404/500 page if provided").
#[derive(Default, Clone)]
pub struct ErrorPages {
  pub not_found: Option<String>,
  pub server_error: Option<String>,
}

/// Security headers merged into every prod response unless user middleware
/// already set them (§4.I). An empty override set leaves the defaults
/// (`X-Content-Type-Options`, `X-Frame-Options`, `Referrer-Policy`) intact.
#[derive(Clone)]
pub struct SecurityHeaders {
  pub overrides: HeaderMap,
}

impl Default for SecurityHeaders {
  fn default() -> Self {
    SecurityHeaders { overrides: HeaderMap::new() }
  }
}

/// Framework-agnostic parts assembled by `SxoServer`, consumed by an adapter
/// crate (e.g. `sxo-axum`) to build a concrete HTTP router for dev or prod.
pub struct SxoParts {
  pub manifest: Manifest,
  pub public_path: String,
  pub loader: Arc<ModuleLoader>,
  pub callback_middleware: Vec<Arc<dyn Middleware>>,
  pub fetch_middleware: Vec<Arc<dyn Fetchware>>,
  pub error_pages: ErrorPages,
  pub security_headers: SecurityHeaders,
}

/// Builder that wires a route manifest, a module resolver, middleware, and
/// optional error-page overrides into `SxoParts`.
pub struct SxoServer {
  manifest: Manifest,
  public_path: String,
  resolver: Arc<dyn RenderModuleResolver>,
  return_error_stub: bool,
  callback_middleware: Vec<Arc<dyn Middleware>>,
  fetch_middleware: Vec<Arc<dyn Fetchware>>,
  error_pages: ErrorPages,
  security_headers: SecurityHeaders,
}

impl SxoServer {
  pub fn new(manifest: Manifest, resolver: Arc<dyn RenderModuleResolver>) -> Self {
    SxoServer {
      manifest,
      public_path: String::new(),
      resolver,
      return_error_stub: false,
      callback_middleware: Vec::new(),
      fetch_middleware: Vec::new(),
      error_pages: ErrorPages::default(),
      security_headers: SecurityHeaders::default(),
    }
  }

  pub fn public_path(mut self, public_path: impl Into<String>) -> Self {
    self.public_path = public_path.into();
    self
  }

  /// Dev servers set this so a module-load failure becomes a dev error page
  /// instead of a propagated error.
  pub fn return_error_stub(mut self, yes: bool) -> Self {
    self.return_error_stub = yes;
    self
  }

  pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
    self.callback_middleware.push(middleware);
    self
  }

  pub fn fetchware(mut self, middleware: Arc<dyn Fetchware>) -> Self {
    self.fetch_middleware.push(middleware);
    self
  }

  pub fn error_pages(mut self, pages: ErrorPages) -> Self {
    self.error_pages = pages;
    self
  }

  pub fn security_headers(mut self, headers: SecurityHeaders) -> Self {
    self.security_headers = headers;
    self
  }

  pub fn into_parts(self) -> SxoParts {
    SxoParts {
      manifest: self.manifest,
      public_path: self.public_path,
      loader: Arc::new(ModuleLoader::new(self.resolver, self.return_error_stub)),
      callback_middleware: self.callback_middleware,
      fetch_middleware: self.fetch_middleware,
      error_pages: self.error_pages,
      security_headers: self.security_headers,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::loader::InMemoryResolver;

  #[test]
  fn builder_carries_public_path_and_defaults() {
    let server = SxoServer::new(Vec::new(), Arc::new(InMemoryResolver::new())).public_path("/assets/");
    let parts = server.into_parts();
    assert_eq!(parts.public_path, "/assets/");
    assert!(parts.callback_middleware.is_empty());
    assert!(parts.error_pages.not_found.is_none());
  }
}
