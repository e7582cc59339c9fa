/* src/server/core/rust/src/errors.rs */

use thiserror::Error;

/// Taxonomy of failures the framework core can produce. Library code returns
/// these instead of panicking; the CLI binary is the only place that turns
/// them into process exits.
#[derive(Debug, Error)]
pub enum SxoError {
  #[error(transparent)]
  Manifest(#[from] sxo_manifest::ManifestError),

  #[error("module load failed for `{source}`: {reason}")]
  ModuleLoad { source: String, reason: String },

  #[error("render failed for `{source}`: {reason}")]
  Render { source: String, reason: String },

  #[error(transparent)]
  Middleware(#[from] crate::middleware::MiddlewareError),

  #[error("static file error: {0}")]
  StaticFile(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
