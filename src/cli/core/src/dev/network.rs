/* src/cli/core/src/dev/network.rs */

use anyhow::{bail, Result};

/// Prefer the configured port; fall back to the next free port in
/// 3000-3099 so a second `sxo dev` run doesn't just fail outright.
pub(super) fn find_available_port(preferred: u16) -> Result<u16> {
  if std::net::TcpListener::bind(("0.0.0.0", preferred)).is_ok() {
    return Ok(preferred);
  }
  for port in 3000..3100 {
    if port != preferred && std::net::TcpListener::bind(("0.0.0.0", port)).is_ok() {
      return Ok(port);
    }
  }
  bail!("no available port found in range 3000-3099");
}
