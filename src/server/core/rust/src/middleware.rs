/* src/server/core/rust/src/middleware.rs */

use std::sync::Arc;

use futures_core::future::BoxFuture;
use thiserror::Error;

use crate::request::{CoreRequest, CoreResponse};

#[derive(Debug, Error)]
#[error("middleware error: {0}")]
pub struct MiddlewareError(pub String);

impl MiddlewareError {
  pub fn new(message: impl Into<String>) -> Self {
    MiddlewareError(message.into())
  }
}

/// The tagged completion union a middleware invocation resolves to: the
/// Rust expression of "next() vs next(err) vs next(null, value) vs thrown".
pub enum MiddlewareOutcome {
  Continue,
  Handled(CoreResponse),
  Failed(MiddlewareError),
}

/// Callback-style middleware: `(request, response, next)`. Used by the dev
/// HTTP handler, which needs early-write / streaming semantics.
pub trait Middleware: Send + Sync {
  fn call<'a>(
    &'a self,
    request: &'a CoreRequest,
    response: &'a mut CoreResponse,
  ) -> BoxFuture<'a, MiddlewareOutcome>;
}

/// Web-standard (fetch-style) middleware: `(request) -> Response | void`.
/// Used by the prod handler and the generator's dry-run request simulation.
pub trait Fetchware: Send + Sync {
  fn handle<'a>(
    &'a self,
    request: &'a CoreRequest,
  ) -> BoxFuture<'a, Result<Option<CoreResponse>, MiddlewareError>>;
}

/// Run a callback-style middleware stack in order. Returns `Ok(true)` if a
/// middleware short-circuited with a response ("handled"), `Ok(false)` if
/// every middleware continued.
pub async fn run_middleware(
  request: &CoreRequest,
  response: &mut CoreResponse,
  stack: &[Arc<dyn Middleware>],
) -> Result<bool, MiddlewareError> {
  for middleware in stack {
    match middleware.call(request, response).await {
      MiddlewareOutcome::Continue => continue,
      MiddlewareOutcome::Handled(handled) => {
        *response = handled;
        return Ok(true);
      }
      MiddlewareOutcome::Failed(err) => return Err(err),
    }
  }
  Ok(false)
}

/// Run a Web-standard middleware stack in order. Returns the first
/// short-circuiting response, or `None` if every middleware passed through.
pub async fn run_fetchware(
  request: &CoreRequest,
  stack: &[Arc<dyn Fetchware>],
) -> Result<Option<CoreResponse>, MiddlewareError> {
  for middleware in stack {
    if let Some(response) = middleware.handle(request).await? {
      return Ok(Some(response));
    }
  }
  Ok(None)
}
