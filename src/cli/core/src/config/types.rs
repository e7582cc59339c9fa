/* src/cli/core/src/config/types.rs */

use serde::Deserialize;

/// Parsed `sxo.toml` project configuration (SPEC_FULL §3 Supplemented, §10).
#[derive(Debug, Clone, Deserialize)]
pub struct SxoConfig {
  pub project: ProjectConfig,
  #[serde(default)]
  pub build: BuildConfig,
  #[serde(default)]
  pub dev: DevConfig,
  #[serde(default)]
  pub pages: PagesConfig,
  #[serde(default)]
  pub clean: CleanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
  #[serde(default = "default_root_id")]
  pub root_id: String,
}

fn default_root_id() -> String {
  "app".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
  #[serde(default = "default_pages_dir")]
  pub pages_dir: String,
  #[serde(default = "default_out_dir")]
  pub out_dir: String,
  #[serde(default = "default_public_path")]
  pub public_path: String,
  /// Shell command that invokes the bundler; run with `DEV=true` by the dev
  /// server's bundler supervisor (§4.H.1).
  pub bundler_command: Option<String>,
  /// Shell command prefix invoked per render: `{render_command} {source}`,
  /// with the route's params JSON piped on stdin (§4.E Supplemented).
  pub render_command: Option<String>,
  #[serde(default = "default_manifest_path")]
  pub manifest_path: String,
}

impl Default for BuildConfig {
  fn default() -> Self {
    BuildConfig {
      pages_dir: default_pages_dir(),
      out_dir: default_out_dir(),
      public_path: default_public_path(),
      bundler_command: None,
      render_command: None,
      manifest_path: default_manifest_path(),
    }
  }
}

fn default_pages_dir() -> String {
  "src/pages".to_string()
}

fn default_out_dir() -> String {
  ".sxo/client".to_string()
}

fn default_public_path() -> String {
  "/".to_string()
}

fn default_manifest_path() -> String {
  ".sxo/route-manifest.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevConfig {
  #[serde(default = "default_dev_port")]
  pub port: u16,
  #[serde(default = "default_hot_replace_path")]
  pub hot_replace_path: String,
}

impl Default for DevConfig {
  fn default() -> Self {
    DevConfig { port: default_dev_port(), hot_replace_path: default_hot_replace_path() }
  }
}

fn default_dev_port() -> u16 {
  3000
}

fn default_hot_replace_path() -> String {
  "/hot-replace".to_string()
}

/// Optional user-supplied 404/500 page source references (§4.I, §7).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesConfig {
  pub not_found: Option<String>,
  pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanConfig {
  #[serde(default)]
  pub commands: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_minimal_config_with_defaults() {
    let toml_str = r#"
[project]
name = "my-app"
"#;
    let config: SxoConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.project.name, "my-app");
    assert_eq!(config.project.root_id, "app");
    assert_eq!(config.build.pages_dir, "src/pages");
    assert_eq!(config.build.out_dir, ".sxo/client");
    assert_eq!(config.build.public_path, "/");
    assert_eq!(config.dev.port, 3000);
    assert_eq!(config.dev.hot_replace_path, "/hot-replace");
    assert!(config.pages.not_found.is_none());
    assert!(config.clean.commands.is_empty());
  }

  #[test]
  fn parses_full_config() {
    let toml_str = r#"
[project]
name = "my-app"
root_id = "root"

[build]
pages_dir = "pages"
out_dir = "dist"
public_path = "/assets/"
bundler_command = "vite build"
render_command = "node render.mjs"
manifest_path = "dist/manifest.json"

[dev]
port = 4000
hot_replace_path = "/__sxo_hmr"

[pages]
not_found = "src/pages/404.tsx"
error = "src/pages/500.tsx"

[clean]
commands = ["rm -rf dist"]
"#;
    let config: SxoConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.project.root_id, "root");
    assert_eq!(config.build.bundler_command.as_deref(), Some("vite build"));
    assert_eq!(config.dev.port, 4000);
    assert_eq!(config.pages.not_found.as_deref(), Some("src/pages/404.tsx"));
    assert_eq!(config.clean.commands, vec!["rm -rf dist"]);
  }
}
