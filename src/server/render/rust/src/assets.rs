/* src/server/render/rust/src/assets.rs */

/// Normalise a public-path prefix: empty stays empty, otherwise it gains
/// exactly one leading slash and loses any trailing slash (the asset path
/// itself already supplies the separator).
pub fn normalise_public_path(public_path: &str) -> String {
  if public_path.is_empty() {
    return String::new();
  }
  let trimmed = public_path.trim_matches('/');
  if trimmed.is_empty() {
    "/".to_string()
  } else {
    format!("/{trimmed}/")
  }
}

/// Insert `<link rel="stylesheet">` and `<script type="module">` tags for
/// the given asset lists, in order, before the first `</head>`. A no-op when
/// both lists are empty.
pub fn inject_assets(html: &str, css: &[String], js: &[String], public_path: &str) -> String {
  if css.is_empty() && js.is_empty() {
    return html.to_string();
  }
  let prefix = normalise_public_path(public_path);
  let mut block = String::new();
  for href in css {
    block.push_str(&format!(r#"<link rel="stylesheet" href="{prefix}{href}">"#));
  }
  for src in js {
    block.push_str(&format!(r#"<script type="module" src="{prefix}{src}"></script>"#));
  }

  if let Some(pos) = html.find("</head>") {
    let mut out = String::with_capacity(html.len() + block.len());
    out.push_str(&html[..pos]);
    out.push_str(&block);
    out.push_str(&html[pos..]);
    out
  } else {
    format!("{html}{block}")
  }
}
