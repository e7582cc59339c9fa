/* src/server/manifest/rust/src/lib.rs */

//! Route manifest construction: walks a page source tree into an ordered,
//! deterministic manifest, and reads/writes the persisted JSON shape written
//! by an external bundler.

mod build;
mod json;
mod types;

pub use build::{build_manifest, compare_specificity, segments_from_path, walk_pages};
pub use json::{load_manifest, save_manifest};
pub use types::{Assets, Manifest, ManifestError, RawRouteDescriptor, RouteDescriptor, Segment};
