/* src/server/adapter/axum/src/prod.rs */

//! The prod HTTP handler (§4.I): a pure request/response path with no
//! watcher, no SSE, no module cache busting — everything the generator (G)
//! already produced is served as-is; dynamic routes still render on demand.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use sxo_core::{run_fetchware, CoreResponse, Fetchware, ModuleLoader, SecurityHeaders};
use sxo_manifest::Manifest;
use sxo_render::{apply_head, inject_assets, match_route};

use crate::convert::{from_core_response, to_core_request};
use crate::html::ensure_doctype;
use crate::mime::looks_content_hashed;
use crate::static_files::{extension_of, resolve_static, StaticLookup};

pub struct ProdState {
  pub manifest: Manifest,
  pub public_path: String,
  pub static_dir: PathBuf,
  pub loader: Arc<ModuleLoader>,
  pub fetch_middleware: Vec<Arc<dyn Fetchware>>,
  pub not_found_source: Option<String>,
  pub server_error_source: Option<String>,
  pub security_headers: SecurityHeaders,
}

pub fn build_prod_router(state: Arc<ProdState>) -> Router {
  Router::new().fallback(get(handle)).with_state(state)
}

async fn handle(State(state): State<Arc<ProdState>>, request: Request<Body>) -> Response {
  let core_request = to_core_request(&request);
  let is_head = core_request.is_head();

  match run_fetchware(&core_request, &state.fetch_middleware).await {
    Ok(Some(response)) => return with_security_headers(from_core_response(response, is_head), &state),
    Ok(None) => {}
    Err(err) => {
      let core = CoreResponse::text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        .with_header(axum::http::header::CACHE_CONTROL, "no-store");
      return with_security_headers(from_core_response(core, is_head), &state);
    }
  }

  if core_request.method != Method::GET && core_request.method != Method::HEAD {
    let core = CoreResponse::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    return with_security_headers(from_core_response(core, is_head), &state);
  }

  if extension_of(&core_request.pathname).is_some() {
    match resolve_static(&state.static_dir, &core_request.pathname).await {
      StaticLookup::Found { bytes, content_type, filename } => {
        let cache_control =
          if looks_content_hashed(&filename) { "public, max-age=31536000, immutable" } else { "public, max-age=300" };
        let mut core = CoreResponse::new(StatusCode::OK)
          .with_header(axum::http::header::CONTENT_TYPE, content_type)
          .with_header(axum::http::header::CACHE_CONTROL, cache_control);
        core.body = bytes.into();
        return with_security_headers(from_core_response(core, is_head), &state);
      }
      StaticLookup::Forbidden => {
        let core = CoreResponse::text(StatusCode::FORBIDDEN, "forbidden");
        return with_security_headers(from_core_response(core, is_head), &state);
      }
      StaticLookup::NotFound => {}
    }
  }

  let Some(matched) = match_route(&core_request.pathname, &state.manifest) else {
    return with_security_headers(not_found_response(&state, is_head).await, &state);
  };

  let descriptor = matched.descriptor;
  if descriptor.generated {
    let path = state.static_dir.join(&descriptor.filename);
    return match tokio::fs::read(&path).await {
      Ok(bytes) => {
        let mut core = CoreResponse::new(StatusCode::OK)
          .with_header(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")
          .with_header(axum::http::header::CACHE_CONTROL, "public, max-age=300");
        core.body = bytes.into();
        with_security_headers(from_core_response(core, is_head), &state)
      }
      Err(_) => with_security_headers(server_error_response(&state, "generated file missing", is_head).await, &state),
    };
  }

  let source = descriptor.source.clone();
  let css = descriptor.assets.css.clone();
  let js = descriptor.assets.js.clone();
  let params = matched.params;

  let rendered = async {
    let module = state.loader.load(&source, false).await.map_err(|e| e.to_string())?;
    let html = module.render(&params).await.map_err(|e| e.to_string())?;
    let head_export = module.head(&params).await;
    let with_head = apply_head(&html, head_export.as_ref());
    Ok::<String, String>(inject_assets(&with_head, &css, &js, &state.public_path))
  }
  .await;

  match rendered {
    Ok(html) => {
      let core = CoreResponse::html(StatusCode::OK, ensure_doctype(html))
        .with_header(axum::http::header::CACHE_CONTROL, "public, max-age=0, must-revalidate");
      with_security_headers(from_core_response(core, is_head), &state)
    }
    Err(reason) => with_security_headers(server_error_response(&state, &reason, is_head).await, &state),
  }
}

async fn not_found_response(state: &ProdState, is_head: bool) -> Response {
  if let Some(source) = &state.not_found_source {
    let params = std::collections::HashMap::new();
    if let Ok(module) = state.loader.load(source, false).await {
      if let Ok(html) = module.render(&params).await {
        let core = CoreResponse::html(StatusCode::NOT_FOUND, ensure_doctype(html))
          .with_header(axum::http::header::CACHE_CONTROL, "public, max-age=0, must-revalidate");
        return from_core_response(core, is_head);
      }
    }
  }
  let core = CoreResponse::text(StatusCode::NOT_FOUND, "Not Found")
    .with_header(axum::http::header::CACHE_CONTROL, "public, max-age=0, must-revalidate");
  from_core_response(core, is_head)
}

async fn server_error_response(state: &ProdState, reason: &str, is_head: bool) -> Response {
  tracing::error!(error = reason, "render failed");
  if let Some(source) = &state.server_error_source {
    let params = std::collections::HashMap::new();
    if let Ok(module) = state.loader.load(source, false).await {
      if let Ok(html) = module.render(&params).await {
        let core = CoreResponse::html(StatusCode::INTERNAL_SERVER_ERROR, ensure_doctype(html))
          .with_header(axum::http::header::CACHE_CONTROL, "no-store");
        return from_core_response(core, is_head);
      }
    }
  }
  let core = CoreResponse::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    .with_header(axum::http::header::CACHE_CONTROL, "no-store");
  from_core_response(core, is_head)
}

/// Merge default security headers into every response unless the caller
/// (user middleware, a short-circuit) has already set a given header (§4.I).
fn with_security_headers(mut response: Response, state: &ProdState) -> Response {
  let headers = response.headers_mut();
  let x_content_type_options = axum::http::HeaderName::from_static("x-content-type-options");
  let x_frame_options = axum::http::HeaderName::from_static("x-frame-options");
  let referrer_policy = axum::http::HeaderName::from_static("referrer-policy");
  apply_default(headers, &state.security_headers.overrides, x_content_type_options, "nosniff");
  apply_default(headers, &state.security_headers.overrides, x_frame_options, "DENY");
  apply_default(headers, &state.security_headers.overrides, referrer_policy, "strict-origin-when-cross-origin");
  for (name, value) in state.security_headers.overrides.iter() {
    headers.entry(name.clone()).or_insert_with(|| value.clone());
  }
  response
}

fn apply_default(headers: &mut HeaderMap, overrides: &HeaderMap, name: axum::http::HeaderName, default: &str) {
  if headers.contains_key(&name) {
    return;
  }
  if let Some(value) = overrides.get(&name) {
    headers.insert(name, value.clone());
  } else if let Ok(value) = default.parse() {
    headers.insert(name, value);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use sxo_core::InMemoryResolver;

  fn state_with_manifest(dir: PathBuf, manifest: Manifest) -> Arc<ProdState> {
    Arc::new(ProdState {
      manifest,
      public_path: "/".into(),
      static_dir: dir,
      loader: Arc::new(ModuleLoader::new(Arc::new(InMemoryResolver::new()), false)),
      fetch_middleware: Vec::new(),
      not_found_source: None,
      server_error_source: None,
      security_headers: SecurityHeaders::default(),
    })
  }

  #[tokio::test]
  async fn unknown_route_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_manifest(dir.path().to_path_buf(), Vec::new());
    let response = not_found_response(&state, false).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
      response.headers().get(axum::http::header::CACHE_CONTROL).unwrap(),
      "public, max-age=0, must-revalidate"
    );
  }

  #[test]
  fn default_security_headers_are_added_when_absent() {
    let state = ProdState {
      manifest: Vec::new(),
      public_path: "/".into(),
      static_dir: PathBuf::new(),
      loader: Arc::new(ModuleLoader::new(Arc::new(InMemoryResolver::new()), false)),
      fetch_middleware: Vec::new(),
      not_found_source: None,
      server_error_source: None,
      security_headers: SecurityHeaders::default(),
    };
    let response = Response::new(Body::empty());
    let response = with_security_headers(response, &state);
    let x_frame_options = axum::http::HeaderName::from_static("x-frame-options");
    assert_eq!(response.headers().get(&x_frame_options).unwrap(), "DENY");
  }
}
