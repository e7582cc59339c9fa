/* src/server/adapter/axum/src/mime.rs */

//! Minimal extension -> MIME table (§4.H.5 Supplemented).

pub fn mime_for_extension(ext: &str) -> &'static str {
  match ext.to_ascii_lowercase().as_str() {
    "html" => "text/html; charset=utf-8",
    "js" | "mjs" => "text/javascript; charset=utf-8",
    "css" => "text/css; charset=utf-8",
    "json" | "map" => "application/json",
    "svg" => "image/svg+xml",
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "woff2" => "font/woff2",
    _ => "application/octet-stream",
  }
}

/// A filename reads as content-hashed when its stem carries a `.`- or
/// `-`-delimited token of 8+ hex digits, the convention bundlers use for
/// cache-busted asset names (e.g. `app.3f9a21c8.js`). Used to choose between
/// the long-lived immutable cache policy and the short one (§6).
pub fn looks_content_hashed(filename: &str) -> bool {
  filename.split(['.', '-']).any(|token| {
    token.len() >= 8 && token.len() <= 32 && token.chars().all(|c| c.is_ascii_hexdigit())
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_extensions_map_correctly() {
    assert_eq!(mime_for_extension("js"), "text/javascript; charset=utf-8");
    assert_eq!(mime_for_extension("MJS"), "text/javascript; charset=utf-8");
    assert_eq!(mime_for_extension("woff2"), "font/woff2");
  }

  #[test]
  fn unknown_extension_falls_back() {
    assert_eq!(mime_for_extension("wasm"), "application/octet-stream");
  }

  #[test]
  fn hashed_filename_detected() {
    assert!(looks_content_hashed("app.3f9a21c8.js"));
    assert!(looks_content_hashed("app-abcdef01.css"));
    assert!(!looks_content_hashed("index.html"));
    assert!(!looks_content_hashed("style.css"));
  }
}
