/* src/server/render/rust/src/helpers.rs */

use serde_json::Value;

/// HTML-escape the five characters that matter in attribute and text
/// contexts: `& < > " '`.
pub fn escape_html(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for c in input.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

/// JS-style truthiness: `false`, `null`, zero, empty string, and empty
/// array/object are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_none_or(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(a) => !a.is_empty(),
    Value::Object(o) => !o.is_empty(),
  }
}

/// Render a scalar JSON value the way it would appear in an HTML attribute
/// or text node.
pub fn stringify(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

/// `style` attribute values may be a CSS object (`{color: "red"}`) instead of
/// a plain string; format it as an inline `key:value;` list.
pub fn format_style_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Object(map) => map
      .iter()
      .filter(|(_, v)| is_truthy(v))
      .map(|(k, v)| format!("{}:{}", kebab_case(k), stringify(v)))
      .collect::<Vec<_>>()
      .join(";"),
    other => stringify(other),
  }
}

fn kebab_case(camel: &str) -> String {
  let mut out = String::with_capacity(camel.len() + 4);
  for c in camel.chars() {
    if c.is_ascii_uppercase() {
      out.push('-');
      out.push(c.to_ascii_lowercase());
    } else {
      out.push(c);
    }
  }
  out
}

/// Tags that are rendered without any closing tag or body.
pub const VOID_TAGS: &[&str] = &["meta", "link", "base"];
/// Tags that always emit an explicit closing tag, even when empty.
pub const FORCE_CLOSING_TAGS: &[&str] = &["script", "style", "title"];

pub fn is_void_tag(tag: &str) -> bool {
  VOID_TAGS.contains(&tag)
}

pub fn is_force_closing_tag(tag: &str) -> bool {
  FORCE_CLOSING_TAGS.contains(&tag)
}
