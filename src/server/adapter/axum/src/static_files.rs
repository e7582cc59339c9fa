/* src/server/adapter/axum/src/static_files.rs */

//! Shared static-asset resolution for the dev and prod handlers (§4.H.4,
//! §6): extension-gated lookup under the client output directory with
//! path-traversal protection.

use std::path::{Path, PathBuf};

pub enum StaticLookup {
  Found { bytes: Vec<u8>, content_type: &'static str, filename: String },
  NotFound,
  Forbidden,
}

/// Only requests whose last path segment carries a file extension are
/// eligible for static lookup; everything else falls through to the route
/// matcher.
pub fn extension_of(request_path: &str) -> Option<&str> {
  let last_segment = request_path.rsplit('/').next().unwrap_or(request_path);
  last_segment.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
}

/// Resolve `request_path` (no leading slash) under `static_dir`, rejecting
/// any resolution that escapes it once `..` components are normalised away.
pub async fn resolve_static(static_dir: &Path, request_path: &str) -> StaticLookup {
  let candidate = static_dir.join(request_path);
  let normalised = normalise(&candidate);
  let root = normalise(static_dir);
  if !normalised.starts_with(&root) {
    return StaticLookup::Forbidden;
  }

  match tokio::fs::read(&normalised).await {
    Ok(bytes) => {
      let ext = extension_of(request_path).unwrap_or("");
      let filename = normalised.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
      StaticLookup::Found { bytes, content_type: crate::mime::mime_for_extension(ext), filename }
    }
    Err(_) => StaticLookup::NotFound,
  }
}

/// Lexically normalise `..`/`.` components without touching the filesystem
/// (the path need not exist yet when this runs).
fn normalise(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      std::path::Component::ParentDir => {
        out.pop();
      }
      std::path::Component::CurDir => {}
      other => out.push(other.as_os_str()),
    }
  }
  out
}
