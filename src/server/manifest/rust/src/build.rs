/* src/server/manifest/rust/src/build.rs */

use std::cmp::Ordering;
use std::path::Path;

use crate::types::{Assets, ManifestError, RouteDescriptor, Segment};

/// Page entry files recognised inside a route directory, checked in order.
const PAGE_FILE_CANDIDATES: &[&str] =
  &["page.tsx", "page.jsx", "page.ts", "page.js", "index.tsx", "index.jsx", "index.ts", "index.js"];

/// Split a route's path template into literal/param segments, rejecting
/// malformed `[name]` captures. An empty path (the root route) has zero
/// segments.
pub fn segments_from_path(path: &str) -> Result<Vec<Segment>, ManifestError> {
  if path.is_empty() {
    return Ok(Vec::new());
  }
  path
    .split('/')
    .filter(|p| !p.is_empty())
    .map(|part| {
      if let Some(name) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
          return Err(ManifestError::MalformedSegment(part.to_string()));
        }
        Ok(Segment::Param(name.to_string()))
      } else {
        Ok(Segment::Literal(part.to_string()))
      }
    })
    .collect()
}

fn path_from_segments(segments: &[Segment]) -> String {
  segments
    .iter()
    .map(|s| match s {
      Segment::Literal(l) => l.clone(),
      Segment::Param(p) => format!("[{p}]"),
    })
    .collect::<Vec<_>>()
    .join("/")
}

/// Walk a page directory tree, producing one descriptor per leaf directory
/// that contains a recognised page entry file. `source` is recorded relative
/// to `pages_dir`'s parent (i.e. it includes the `pages_dir` path component),
/// matching the convention of a project-root-relative source reference.
pub fn walk_pages(pages_dir: &Path) -> Result<Vec<RouteDescriptor>, ManifestError> {
  let mut out = Vec::new();
  walk_dir(pages_dir, pages_dir, &mut Vec::new(), &mut out)?;
  Ok(out)
}

fn walk_dir(
  pages_dir: &Path,
  current: &Path,
  segments: &mut Vec<Segment>,
  out: &mut Vec<RouteDescriptor>,
) -> Result<(), ManifestError> {
  let mut entries: Vec<_> = std::fs::read_dir(current)?.collect::<Result<_, _>>()?;
  entries.sort_by_key(std::fs::DirEntry::file_name);

  for candidate in PAGE_FILE_CANDIDATES {
    let page_path = current.join(candidate);
    if page_path.is_file() {
      let filename = if segments.is_empty() {
        "index.html".to_string()
      } else {
        format!("{}/index.html", path_from_segments(segments))
      };
      let source = page_path
        .strip_prefix(pages_dir.parent().unwrap_or(pages_dir))
        .unwrap_or(&page_path)
        .to_string_lossy()
        .replace('\\', "/");
      out.push(RouteDescriptor {
        path: path_from_segments(segments),
        segments: segments.clone(),
        filename,
        source,
        assets: Assets::default(),
        generated: false,
      });
      break;
    }
  }

  for entry in entries {
    let path = entry.path();
    if !path.is_dir() {
      continue;
    }
    let name = entry.file_name();
    let name = name.to_string_lossy();
    let segment = if let Some(param) = name.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
      if param.is_empty() || !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ManifestError::MalformedSegment(name.to_string()));
      }
      Segment::Param(param.to_string())
    } else {
      Segment::Literal(name.to_string())
    };
    segments.push(segment);
    walk_dir(pages_dir, &path, segments, out)?;
    segments.pop();
  }

  Ok(())
}

/// Specificity ordering: fewer dynamic segments first, then longer literal
/// prefixes first, then lexicographic path order.
pub fn compare_specificity(a: &RouteDescriptor, b: &RouteDescriptor) -> Ordering {
  a.dynamic_count()
    .cmp(&b.dynamic_count())
    .then_with(|| b.literal_prefix_len().cmp(&a.literal_prefix_len()))
    .then_with(|| a.path.cmp(&b.path))
}

/// Build a deterministically ordered manifest from a page directory tree.
pub fn build_manifest(pages_dir: &Path) -> Result<Vec<RouteDescriptor>, ManifestError> {
  let mut routes = walk_pages(pages_dir)?;
  routes.sort_by(compare_specificity);
  Ok(routes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
  }

  #[test]
  fn builds_manifest_with_specificity_ordering() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    touch(&pages.join("page.tsx"));
    touch(&pages.join("about/page.tsx"));
    touch(&pages.join("blog/[slug]/page.tsx"));
    touch(&pages.join("blog/posts/page.tsx"));

    let manifest = build_manifest(&pages).unwrap();
    let paths: Vec<_> = manifest.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["", "about", "blog/posts", "blog/[slug]"]);
  }

  #[test]
  fn static_vs_dynamic_classification() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    touch(&pages.join("blog/[slug]/page.tsx"));
    let manifest = build_manifest(&pages).unwrap();
    assert!(manifest[0].is_dynamic());
  }

  #[test]
  fn malformed_dynamic_segment_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    touch(&pages.join("blog/[]/page.tsx"));
    assert!(build_manifest(&pages).is_err());
  }

  #[test]
  fn empty_pages_dir_yields_empty_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    fs::create_dir_all(&pages).unwrap();
    let manifest = build_manifest(&pages).unwrap();
    assert!(manifest.is_empty());
  }
}
