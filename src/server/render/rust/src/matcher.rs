/* src/server/render/rust/src/matcher.rs */

use std::collections::HashMap;

use sxo_manifest::{Manifest, RouteDescriptor, Segment};

/// The descriptor matched for a request, plus any captured dynamic params.
pub struct MatchResult<'a> {
  pub descriptor: &'a RouteDescriptor,
  pub params: HashMap<String, String>,
}

/// Match a decoded pathname (leading slash already stripped by the caller)
/// against an ordered manifest. The first descriptor whose segment count and
/// literal segments agree wins; param segments capture unconditionally.
pub fn match_route<'a>(pathname: &str, manifest: &'a Manifest) -> Option<MatchResult<'a>> {
  let trimmed = pathname.trim_start_matches('/').trim_end_matches('/');
  let parts: Vec<&str> = if trimmed.is_empty() { Vec::new() } else { trimmed.split('/').collect() };

  manifest.iter().find_map(|descriptor| {
    if descriptor.segments.len() != parts.len() {
      return None;
    }
    let mut params = HashMap::new();
    for (segment, part) in descriptor.segments.iter().zip(parts.iter()) {
      match segment {
        Segment::Literal(lit) => {
          if lit != part {
            return None;
          }
        }
        Segment::Param(name) => {
          params.insert(name.clone(), (*part).to_string());
        }
      }
    }
    Some(MatchResult { descriptor, params })
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use sxo_manifest::{Assets, RouteDescriptor, Segment};

  fn descriptor(path: &str, segments: Vec<Segment>) -> RouteDescriptor {
    RouteDescriptor {
      path: path.into(),
      segments,
      filename: format!("{path}/index.html"),
      source: format!("src/pages/{path}/page.tsx"),
      assets: Assets::default(),
      generated: false,
    }
  }

  #[test]
  fn matches_root_on_empty_pathname() {
    let manifest = vec![descriptor("", vec![])];
    let result = match_route("", &manifest).unwrap();
    assert_eq!(result.descriptor.path, "");
  }

  #[test]
  fn captures_dynamic_segment() {
    let manifest =
      vec![descriptor("blog/[slug]", vec![Segment::Literal("blog".into()), Segment::Param("slug".into())])];
    let result = match_route("blog/hello-world", &manifest).unwrap();
    assert_eq!(result.params.get("slug"), Some(&"hello-world".to_string()));
  }

  #[test]
  fn first_match_wins_and_trailing_slash_ignored() {
    let manifest = vec![
      descriptor("about", vec![Segment::Literal("about".into())]),
      descriptor("[page]", vec![Segment::Param("page".into())]),
    ];
    let result = match_route("about/", &manifest).unwrap();
    assert_eq!(result.descriptor.path, "about");
  }

  #[test]
  fn no_match_returns_none() {
    let manifest = vec![descriptor("about", vec![Segment::Literal("about".into())])];
    assert!(match_route("missing", &manifest).is_none());
  }
}
