/* src/server/adapter/axum/src/dev.rs */

//! The dev HTTP handler (§4.H.4): one route behind which middleware,
//! static serving, the SSE endpoint, and page rendering are all decided
//! per-request. Owns no watcher or bundler; the CLI drives those and calls
//! back into `manifest`/`loader`/`sse_hub` as files change.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use sxo_core::{run_middleware, CoreResponse, Middleware, ModuleLoader};
use sxo_manifest::Manifest;
use sxo_render::{apply_head, inject_assets, match_route};

use crate::convert::{from_core_response, to_core_request};
use crate::html::{ensure_doctype, inject_hot_reload_script};
use crate::sse::SseHub;
use crate::static_files::{extension_of, resolve_static, StaticLookup};

pub struct DevState {
  pub manifest: Arc<RwLock<Manifest>>,
  pub public_path: String,
  pub static_dir: PathBuf,
  pub hot_replace_path: String,
  pub loader: Arc<ModuleLoader>,
  pub middleware: Vec<Arc<dyn Middleware>>,
  pub not_found_source: Option<String>,
  pub server_error_source: Option<String>,
}

/// Build the dev router. The caller (the CLI) owns the `SseHub`, the file
/// watchers, and the bundler supervisor, and mutates `state.manifest` /
/// calls `state.loader.clear()` as the output directory changes.
pub fn build_dev_router(state: Arc<DevState>, sse_hub: Arc<SseHub>) -> Router {
  Router::new().fallback(get(handle)).with_state((state, sse_hub))
}

async fn handle(
  State((state, sse_hub)): State<(Arc<DevState>, Arc<SseHub>)>,
  request: Request<Body>,
) -> Response {
  let full_path = request.uri().path().to_string();
  let core_request = to_core_request(&request);
  let is_head = core_request.is_head();

  let mut response = CoreResponse::new(StatusCode::OK);
  match run_middleware(&core_request, &mut response, &state.middleware).await {
    Ok(true) => return from_core_response(response, is_head),
    Ok(false) => {}
    Err(err) => return dev_error_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &err.to_string(), is_head).await,
  }

  if extension_of(&core_request.pathname).is_some() {
    match resolve_static(&state.static_dir, &core_request.pathname).await {
      StaticLookup::Found { bytes, content_type, .. } => {
        let mut core = CoreResponse::new(StatusCode::OK)
          .with_header(axum::http::header::CONTENT_TYPE, content_type)
          .with_header(axum::http::header::CACHE_CONTROL, "no-cache");
        core.body = bytes.into();
        return from_core_response(core, is_head);
      }
      StaticLookup::Forbidden => {
        return from_core_response(CoreResponse::text(StatusCode::FORBIDDEN, "forbidden"), is_head);
      }
      StaticLookup::NotFound => {}
    }
  }

  if full_path == state.hot_replace_path {
    return open_sse_stream(sse_hub);
  }

  let manifest_snapshot = state.manifest.read().expect("manifest lock poisoned").clone();
  let Some(matched) = match_route(&core_request.pathname, &manifest_snapshot) else {
    return dev_error_page(&state, StatusCode::NOT_FOUND, "Not Found", is_head).await;
  };

  let source = matched.descriptor.source.clone();
  let css = matched.descriptor.assets.css.clone();
  let js = matched.descriptor.assets.js.clone();
  let params = matched.params;

  let module = match state.loader.load(&source, false).await {
    Ok(module) => module,
    Err(err) => return dev_error_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &err.to_string(), is_head).await,
  };

  let rendered = match module.render(&params).await {
    Ok(html) => html,
    Err(err) => return dev_error_page(&state, StatusCode::INTERNAL_SERVER_ERROR, &err.to_string(), is_head).await,
  };

  let head_export = module.head(&params).await;
  let with_head = apply_head(&rendered, head_export.as_ref());
  let with_assets = inject_assets(&with_head, &css, &js, &state.public_path);
  let with_script = inject_hot_reload_script(&with_assets, &state.hot_replace_path, &core_request.pathname);
  let html = ensure_doctype(with_script);

  let core = CoreResponse::html(StatusCode::OK, html).with_header(axum::http::header::CACHE_CONTROL, "no-store");
  from_core_response(core, is_head)
}

fn open_sse_stream(sse_hub: Arc<SseHub>) -> Response {
  let stream = sse_hub.register();
  let sse: Sse<_> = Sse::new(stream).keep_alive(KeepAlive::default());
  let mut response = sse.into_response();
  response.headers_mut().insert(axum::http::header::CACHE_CONTROL, "no-cache".parse().unwrap());
  response
}

/// Render the dev error page for `status`: the user's 404/500 override if
/// configured, else a plain-text fallback (§7).
async fn dev_error_page(state: &DevState, status: StatusCode, message: &str, is_head: bool) -> Response {
  let override_source =
    if status == StatusCode::NOT_FOUND { &state.not_found_source } else { &state.server_error_source };

  if let Some(source) = override_source {
    let params = std::collections::HashMap::new();
    if let Ok(module) = state.loader.load(source, false).await {
      if let Ok(html) = module.render(&params).await {
        let core = CoreResponse::html(status, ensure_doctype(html))
          .with_header(axum::http::header::CACHE_CONTROL, "no-store");
        return from_core_response(core, is_head);
      }
    }
  }

  let core =
    CoreResponse::text(status, message.to_string()).with_header(axum::http::header::CACHE_CONTROL, "no-store");
  from_core_response(core, is_head)
}

#[cfg(test)]
mod tests {
  use super::*;
  use sxo_core::{InMemoryResolver, ModuleLoader};

  fn empty_state(dir: PathBuf) -> Arc<DevState> {
    Arc::new(DevState {
      manifest: Arc::new(RwLock::new(Vec::new())),
      public_path: "/".into(),
      static_dir: dir,
      hot_replace_path: "/hot-replace".into(),
      loader: Arc::new(ModuleLoader::new(Arc::new(InMemoryResolver::new()), true)),
      middleware: Vec::new(),
      not_found_source: None,
      server_error_source: None,
    })
  }

  #[tokio::test]
  async fn not_found_without_override_is_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let state = empty_state(dir.path().to_path_buf());
    let response = dev_error_page(&state, StatusCode::NOT_FOUND, "Not Found", false).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }
}
