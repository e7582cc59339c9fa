/* src/server/core/rust/src/request.rs */

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

/// Runtime-agnostic request view. Adapters translate their host framework's
/// native request type into this shape at the edge; the core never imports a
/// host-specific type.
#[derive(Debug, Clone)]
pub struct CoreRequest {
  pub method: Method,
  /// Decoded pathname, leading slash stripped (matches the matcher contract).
  pub pathname: String,
  pub query: String,
  pub headers: HeaderMap,
}

impl CoreRequest {
  pub fn new(method: Method, pathname: impl Into<String>) -> Self {
    CoreRequest { method, pathname: pathname.into(), query: String::new(), headers: HeaderMap::new() }
  }

  pub fn is_head(&self) -> bool {
    self.method == Method::HEAD
  }
}

/// Runtime-agnostic response. `body` is empty for HEAD requests by
/// convention of the caller, not enforced here.
#[derive(Debug, Clone)]
pub struct CoreResponse {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: Bytes,
}

impl CoreResponse {
  pub fn new(status: StatusCode) -> Self {
    CoreResponse { status, headers: HeaderMap::new(), body: Bytes::new() }
  }

  pub fn html(status: StatusCode, body: impl Into<Bytes>) -> Self {
    let mut response = CoreResponse::new(status);
    response.headers.insert(http::header::CONTENT_TYPE, "text/html; charset=utf-8".parse().unwrap());
    response.body = body.into();
    response
  }

  pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
    let mut response = CoreResponse::new(status);
    response.headers.insert(http::header::CONTENT_TYPE, "text/plain; charset=utf-8".parse().unwrap());
    response.body = body.into();
    response
  }

  pub fn with_header(mut self, name: http::header::HeaderName, value: &str) -> Self {
    if let Ok(value) = value.parse() {
      self.headers.insert(name, value);
    }
    self
  }

  /// Strip the body while preserving status, content-type, and all headers
  /// (used for HEAD responses).
  pub fn without_body(mut self) -> Self {
    self.body = Bytes::new();
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn without_body_preserves_headers_and_status() {
    let resp = CoreResponse::html(StatusCode::OK, "<html></html>").without_body();
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.is_empty());
    assert_eq!(resp.headers.get(http::header::CONTENT_TYPE).unwrap(), "text/html; charset=utf-8");
  }
}
