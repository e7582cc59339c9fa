/* src/server/adapter/axum/src/lib.rs */

//! Axum adapter for SXO: turns the framework-agnostic `SxoParts` (built by
//! `sxo-core::SxoServer`) into a concrete `axum::Router` for either the dev
//! server (hot-reload HTTP handler + SSE hub) or the prod server (pure
//! request/response handler). File watching and the bundler supervisor are
//! owned by `sxo-cli`, not this crate; it only exposes the hooks
//! (`SseHub::broadcast`, `DevState::manifest`, `ModuleLoader::clear`) the CLI
//! calls as the project rebuilds.

mod convert;
mod dev;
mod html;
mod mime;
mod prod;
mod sse;
mod static_files;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::Router;
use sxo_core::SxoParts;

pub use dev::{build_dev_router, DevState};
pub use mime::{looks_content_hashed, mime_for_extension};
pub use prod::{build_prod_router, ProdState};
pub use sse::SseHub;

/// Assemble the dev router and its `SseHub` from an `SxoParts` built with
/// `return_error_stub(true)`. The caller keeps the returned `SseHub` and
/// `DevState` to wire up watchers: broadcasting to the hub and clearing the
/// loader's cache on output changes, and swapping `DevState.manifest` on a
/// manifest reload.
pub fn dev_server(parts: SxoParts, static_dir: PathBuf, hot_replace_path: String) -> (Router, Arc<DevState>, Arc<SseHub>) {
  let state = Arc::new(DevState {
    manifest: Arc::new(RwLock::new(parts.manifest)),
    public_path: parts.public_path,
    static_dir,
    hot_replace_path,
    loader: parts.loader,
    middleware: parts.callback_middleware,
    not_found_source: parts.error_pages.not_found,
    server_error_source: parts.error_pages.server_error,
  });
  let sse_hub = Arc::new(SseHub::new());
  let router = build_dev_router(state.clone(), sse_hub.clone());
  (router, state, sse_hub)
}

/// Assemble the prod router from an `SxoParts` built with
/// `return_error_stub(false)` (prod surfaces module-load failures as 500s,
/// it never serves a dev error stub).
pub fn prod_server(parts: SxoParts, static_dir: PathBuf) -> Router {
  let state = Arc::new(ProdState {
    manifest: parts.manifest,
    public_path: parts.public_path,
    static_dir,
    loader: parts.loader,
    fetch_middleware: parts.fetch_middleware,
    not_found_source: parts.error_pages.not_found,
    server_error_source: parts.error_pages.server_error,
    security_headers: parts.security_headers,
  });
  build_prod_router(state)
}
