/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

pub use loader::{find_sxo_config, load_sxo_config};
pub use types::{BuildConfig, CleanConfig, DevConfig, PagesConfig, ProjectConfig, SxoConfig};
