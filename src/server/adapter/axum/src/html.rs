/* src/server/adapter/axum/src/html.rs */

//! Small HTML document helpers shared by the dev and prod handlers.

/// Prepend `<!doctype html>` unless the document already opens with one.
pub fn ensure_doctype(html: String) -> String {
  let trimmed = html.trim_start();
  if trimmed.len() >= 9 && trimmed[..9].eq_ignore_ascii_case("<!doctype") {
    html
  } else {
    format!("<!doctype html>{html}")
  }
}

/// Inject the dev-only hot-reload client: an `EventSource` against the SSE
/// endpoint carrying the current pathname, reloading the page on any
/// message (§4.H.4 step 5).
pub fn inject_hot_reload_script(html: &str, hot_replace_path: &str, pathname: &str) -> String {
  let script = format!(
    "<script>(function(){{\
       var es=new EventSource('{hot_replace_path}?href='+encodeURIComponent('/{pathname}'));\
       es.onmessage=function(){{location.reload();}};\
     }})();</script>"
  );
  if let Some(pos) = html.find("</body>") {
    let mut out = String::with_capacity(html.len() + script.len());
    out.push_str(&html[..pos]);
    out.push_str(&script);
    out.push_str(&html[pos..]);
    out
  } else {
    format!("{html}{script}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ensure_doctype_is_idempotent() {
    let once = ensure_doctype("<html></html>".to_string());
    let twice = ensure_doctype(once.clone());
    assert_eq!(once, twice);
    assert!(once.starts_with("<!doctype html>"));
  }

  #[test]
  fn hot_reload_script_lands_before_closing_body() {
    let html = "<html><body>hi</body></html>";
    let out = inject_hot_reload_script(html, "/hot-replace", "blog/hello");
    assert!(out.contains("/hot-replace?href="));
    assert!(out.find("EventSource").unwrap() < out.find("</body>").unwrap());
  }

  #[test]
  fn missing_body_tag_appends_script() {
    let html = "<html></html>";
    let out = inject_hot_reload_script(html, "/hot-replace", "");
    assert!(out.ends_with("</script>"));
  }
}
