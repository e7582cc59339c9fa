/* src/server/render/rust/src/head.rs */

use serde_json::{Map, Value};

use crate::helpers::{escape_html, is_force_closing_tag, is_truthy, is_void_tag, stringify};

const HEAD_START: &str = "<!--sxo:head:start-->";
const HEAD_END: &str = "<!--sxo:head:end-->";

/// A normalised `{tag, attributes, content}` entry derived from a head
/// export. `content` is the inner text for force-closing tags and is never
/// set for void tags.
struct HeadEntry {
  tag: String,
  attrs: Map<String, Value>,
  content: Option<String>,
}

/// Remove the previous managed head block, if any, leaving the rest of the
/// document untouched.
fn strip_managed_block(html: &str) -> String {
  match (html.find(HEAD_START), html.find(HEAD_END)) {
    (Some(start), Some(end)) if end >= start => {
      let mut out = String::with_capacity(html.len());
      out.push_str(&html[..start]);
      out.push_str(&html[end + HEAD_END.len()..]);
      out
    }
    _ => html.to_string(),
  }
}

/// Normalise one `head` export key into an ordered list of entries. Accepts
/// a single bag, an array of bags, or — for `title` only — a bare scalar.
fn normalise_key(tag: &str, value: &Value) -> Vec<HeadEntry> {
  match value {
    Value::Array(items) => items.iter().filter_map(|item| bag_to_entry(tag, item)).collect(),
    Value::String(_) | Value::Number(_) if tag == "title" => {
      vec![HeadEntry { tag: tag.to_string(), attrs: Map::new(), content: Some(stringify(value)) }]
    }
    Value::Object(_) => bag_to_entry(tag, value).into_iter().collect(),
    _ => Vec::new(),
  }
}

fn bag_to_entry(tag: &str, bag: &Value) -> Option<HeadEntry> {
  let Value::Object(map) = bag else {
    return None;
  };
  let mut attrs = map.clone();
  let content = attrs.remove("content").filter(is_truthy).map(|v| stringify(&v));
  Some(HeadEntry { tag: tag.to_string(), attrs, content })
}

fn render_attrs(attrs: &Map<String, Value>) -> String {
  let mut out = String::new();
  for (key, value) in attrs {
    if !is_truthy(value) {
      continue;
    }
    let key = if key == "httpEquiv" { "http-equiv".to_string() } else { key.clone() };
    if matches!(value, Value::Bool(true)) {
      out.push(' ');
      out.push_str(&key);
      continue;
    }
    let rendered = if key == "style" {
      crate::helpers::format_style_value(value)
    } else {
      stringify(value)
    };
    out.push(' ');
    out.push_str(&key);
    out.push_str("=\"");
    out.push_str(&escape_html(&rendered));
    out.push('"');
  }
  out
}

fn render_entry(entry: &HeadEntry) -> String {
  let attrs = render_attrs(&entry.attrs);
  if is_void_tag(&entry.tag) {
    return format!("<{}{attrs}>", entry.tag);
  }
  if is_force_closing_tag(&entry.tag) {
    let body = entry.content.as_deref().unwrap_or("");
    let body = if entry.tag == "script" || entry.tag == "style" { body.to_string() } else { escape_html(body) };
    return format!("<{}{attrs}>{body}</{}>", entry.tag, entry.tag);
  }
  match &entry.content {
    Some(body) => format!("<{}{attrs}>{}</{}>", entry.tag, escape_html(body), entry.tag),
    None => format!("<{}{attrs}></{}>", entry.tag, entry.tag),
  }
}

/// Replace the managed head block inside `html` with a freshly rendered set
/// of tags derived from `head_export`. Always removes any previous block
/// first. Returns the cleaned document unchanged if the export is absent or
/// empty.
pub fn apply_head(html: &str, head_export: Option<&Value>) -> String {
  let cleaned = strip_managed_block(html);

  let Some(Value::Object(export)) = head_export else {
    return cleaned;
  };
  if export.is_empty() {
    return cleaned;
  }

  let entries: Vec<HeadEntry> =
    export.iter().flat_map(|(tag, value)| normalise_key(tag, value)).collect();
  if entries.is_empty() {
    return cleaned;
  }

  let rendered: Vec<String> = entries.iter().map(render_entry).collect();
  let block = format!("{HEAD_START}\n{}\n{HEAD_END}", rendered.join("\n"));

  if let Some(pos) = cleaned.find("</head>") {
    let mut out = String::with_capacity(cleaned.len() + block.len());
    out.push_str(&cleaned[..pos]);
    out.push_str(&block);
    out.push_str(&cleaned[pos..]);
    out
  } else {
    format!("{cleaned}{block}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn applies_title_and_meta_before_head_close() {
    let doc = "<html><head><title>Old</title></head><body></body></html>";
    let head = json!({ "title": "New", "meta": [{ "name": "description", "content": "x" }] });
    let out = apply_head(doc, Some(&head));
    assert!(out.contains("<title>Old</title>"));
    assert!(out.contains(HEAD_START));
    assert!(out.contains("<title>New</title>"));
    assert!(out.contains(r#"<meta name="description" content="x">"#));
    let head_close = out.find("</head>").unwrap();
    let block_start = out.find(HEAD_START).unwrap();
    assert!(block_start < head_close);
  }

  #[test]
  fn idempotent_when_reapplied() {
    let doc = "<html><head></head><body></body></html>";
    let head = json!({ "title": "Same" });
    let once = apply_head(doc, Some(&head));
    let twice = apply_head(&once, Some(&head));
    assert_eq!(once, twice);
  }

  #[test]
  fn no_head_export_returns_cleaned_document() {
    let doc = format!("<html><head>{HEAD_START}\nstale\n{HEAD_END}</head></html>");
    let out = apply_head(&doc, None);
    assert!(!out.contains(HEAD_START));
    assert!(!out.contains("stale"));
  }

  #[test]
  fn appends_block_when_head_tag_absent() {
    let doc = "<div>no head here</div>";
    let head = json!({ "title": "T" });
    let out = apply_head(doc, Some(&head));
    assert!(out.ends_with(HEAD_END));
  }

  #[test]
  fn void_tag_drops_content_attribute() {
    let doc = "<head></head>";
    let head = json!({ "link": { "rel": "icon", "href": "/f.ico", "content": "ignored" } });
    let out = apply_head(doc, Some(&head));
    assert!(out.contains(r#"<link rel="icon" href="/f.ico">"#));
    assert!(!out.contains("ignored"));
  }

  #[test]
  fn boolean_true_emits_bare_attribute() {
    let doc = "<head></head>";
    let head = json!({ "script": { "src": "/a.js", "defer": true } });
    let out = apply_head(doc, Some(&head));
    assert!(out.contains(r#"<script src="/a.js" defer></script>"#));
  }

  #[test]
  fn escapes_attribute_values() {
    let doc = "<head></head>";
    let head = json!({ "meta": { "name": "x", "content": "<a>&\"'" } });
    let out = apply_head(doc, Some(&head));
    assert!(out.contains(r#"content="&lt;a&gt;&amp;&quot;&#39;""#));
  }
}
