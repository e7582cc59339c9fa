/* src/server/manifest/rust/src/types.rs */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One path segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
  Literal(String),
  Param(String),
}

impl Segment {
  pub fn is_param(&self) -> bool {
    matches!(self, Segment::Param(_))
  }
}

/// Ordered stylesheet and script URLs bundled for a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
  #[serde(default)]
  pub css: Vec<String>,
  #[serde(default)]
  pub js: Vec<String>,
}

/// A single entry in the route manifest: one URL template and its server source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRouteDescriptor", into = "RawRouteDescriptor")]
pub struct RouteDescriptor {
  pub path: String,
  pub segments: Vec<Segment>,
  pub filename: String,
  pub source: String,
  pub assets: Assets,
  pub generated: bool,
}

impl RouteDescriptor {
  /// A route is dynamic if any segment captures a parameter.
  pub fn is_dynamic(&self) -> bool {
    self.segments.iter().any(Segment::is_param)
  }

  /// Count of leading literal segments before the first param (or all
  /// segments if the route has none). Used as the specificity tiebreaker.
  pub fn literal_prefix_len(&self) -> usize {
    self.segments.iter().take_while(|s| !s.is_param()).count()
  }

  pub fn dynamic_count(&self) -> usize {
    self.segments.iter().filter(|s| s.is_param()).count()
  }
}

/// On-disk / wire shape of a manifest entry, as written by the bundler.
/// `segments` is never persisted; it is always recomputed from `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRouteDescriptor {
  #[serde(default)]
  pub path: String,
  pub filename: String,
  pub jsx: String,
  #[serde(default)]
  pub assets: Assets,
  #[serde(default)]
  pub generated: bool,
}

impl TryFrom<RawRouteDescriptor> for RouteDescriptor {
  type Error = ManifestError;

  fn try_from(raw: RawRouteDescriptor) -> Result<Self, Self::Error> {
    let segments = crate::build::segments_from_path(&raw.path)?;
    Ok(RouteDescriptor {
      path: raw.path,
      segments,
      filename: raw.filename,
      source: raw.jsx,
      assets: raw.assets,
      generated: raw.generated,
    })
  }
}

impl From<RouteDescriptor> for RawRouteDescriptor {
  fn from(d: RouteDescriptor) -> Self {
    RawRouteDescriptor {
      path: d.path,
      filename: d.filename,
      jsx: d.source,
      assets: d.assets,
      generated: d.generated,
    }
  }
}

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest is missing or not readable: {0}")]
  NotFound(String),
  #[error("manifest is not a JSON array")]
  NotAnArray,
  #[error("malformed dynamic segment `{0}`: parameter name must be non-empty")]
  MalformedSegment(String),
  #[error("failed to parse manifest JSON: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("io error reading manifest: {0}")]
  Io(#[from] std::io::Error),
}

pub type Manifest = Vec<RouteDescriptor>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_round_trips_through_route_descriptor() {
    let raw = RawRouteDescriptor {
      path: "blog/[slug]".into(),
      filename: "blog/[slug]/index.html".into(),
      jsx: "src/pages/blog/[slug]/page.tsx".into(),
      assets: Assets { css: vec!["blog.css".into()], js: vec!["blog.js".into()] },
      generated: false,
    };
    let descriptor = RouteDescriptor::try_from(raw.clone()).unwrap();
    assert_eq!(descriptor.segments, vec![
      Segment::Literal("blog".into()),
      Segment::Param("slug".into()),
    ]);
    assert!(descriptor.is_dynamic());
    let back: RawRouteDescriptor = descriptor.into();
    assert_eq!(back.path, raw.path);
    assert_eq!(back.jsx, raw.jsx);
  }

  #[test]
  fn malformed_segment_rejected() {
    let raw = RawRouteDescriptor {
      path: "blog/[]".into(),
      filename: "blog/index.html".into(),
      jsx: "src/pages/blog/page.tsx".into(),
      assets: Assets::default(),
      generated: false,
    };
    assert!(RouteDescriptor::try_from(raw).is_err());
  }
}
