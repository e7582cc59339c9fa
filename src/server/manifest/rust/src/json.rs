/* src/server/manifest/rust/src/json.rs */

use std::path::Path;

use crate::types::{Manifest, ManifestError};

/// Load a persisted route manifest from disk. The file must contain a JSON
/// array; anything else is a manifest error rather than a panic.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
  let text = std::fs::read_to_string(path)
    .map_err(|_| ManifestError::NotFound(path.display().to_string()))?;
  let value: serde_json::Value = serde_json::from_str(&text)?;
  if !value.is_array() {
    return Err(ManifestError::NotAnArray);
  }
  Ok(serde_json::from_value(value)?)
}

/// Write a route manifest back to disk as pretty JSON.
pub fn save_manifest(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
  let json = serde_json::to_string_pretty(manifest)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Assets, RouteDescriptor, Segment};

  fn sample() -> Manifest {
    vec![RouteDescriptor {
      path: "about".into(),
      segments: vec![Segment::Literal("about".into())],
      filename: "about/index.html".into(),
      source: "src/pages/about/page.tsx".into(),
      assets: Assets { css: vec!["about.css".into()], js: vec![] },
      generated: false,
    }]
  }

  #[test]
  fn round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("route-manifest.json");
    save_manifest(&path, &sample()).unwrap();
    let loaded = load_manifest(&path).unwrap();
    assert_eq!(loaded, sample());
  }

  #[test]
  fn rejects_non_array_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("route-manifest.json");
    std::fs::write(&path, "{}").unwrap();
    assert!(matches!(load_manifest(&path), Err(ManifestError::NotAnArray)));
  }

  #[test]
  fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    assert!(matches!(load_manifest(&path), Err(ManifestError::NotFound(_))));
  }
}
