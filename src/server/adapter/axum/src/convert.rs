/* src/server/adapter/axum/src/convert.rs */

//! Translation between Axum's native request/response types and the
//! framework-agnostic `CoreRequest`/`CoreResponse` contract `sxo-core`
//! operates on.

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use percent_encoding::percent_decode_str;
use sxo_core::{CoreRequest, CoreResponse};

/// Build a `CoreRequest` from an inbound Axum request. `pathname` is
/// percent-decoded and drops the leading slash to match the matcher's
/// contract (§3/§4.B: "percent-encoded bytes are assumed already decoded by
/// the caller"); `query` is the raw query string with no leading `?`.
pub fn to_core_request(request: &Request<Body>) -> CoreRequest {
  let uri = request.uri();
  let decoded = percent_decode_str(uri.path()).decode_utf8_lossy();
  let pathname = decoded.trim_start_matches('/').to_string();
  let query = uri.query().unwrap_or("").to_string();
  CoreRequest {
    method: request.method().clone(),
    pathname,
    query,
    headers: request.headers().clone(),
  }
}

/// Render a `CoreResponse` as an Axum response, stripping the body (but
/// preserving status, content-type, and every other header) when `is_head`.
pub fn from_core_response(mut core: CoreResponse, is_head: bool) -> Response {
  if is_head {
    core = core.without_body();
  }
  let mut builder = Response::builder().status(core.status);
  if let Some(headers) = builder.headers_mut() {
    *headers = core.headers;
  }
  builder.body(Body::from(core.body)).unwrap_or_else(|_| Response::new(Body::empty()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Method, StatusCode};

  #[test]
  fn strips_leading_slash_from_pathname() {
    let request = Request::builder().method(Method::GET).uri("/blog/hello?x=1").body(Body::empty()).unwrap();
    let core = to_core_request(&request);
    assert_eq!(core.pathname, "blog/hello");
    assert_eq!(core.query, "x=1");
  }

  #[test]
  fn percent_encoded_segments_are_decoded() {
    let request = Request::builder().method(Method::GET).uri("/caf%C3%A9/%5Bslug%5D").body(Body::empty()).unwrap();
    let core = to_core_request(&request);
    assert_eq!(core.pathname, "café/[slug]");
  }

  #[test]
  fn head_response_drops_body_but_keeps_headers() {
    let core = CoreResponse::html(StatusCode::OK, "<html></html>");
    let response = from_core_response(core, true);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(), "text/html; charset=utf-8");
  }
}
