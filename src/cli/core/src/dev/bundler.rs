/* src/cli/core/src/dev/bundler.rs */

// One-shot bundler invocation for the dev server's rebuild cycle (§4.H.1).
// Unlike a long-running dev process, the bundler is run to completion on
// every source change: it regenerates the client output directory and the
// route manifest, then exits.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::ui::{CYAN, DIM, GREEN, RED, RESET};

/// Run `command` to completion with `DEV=true` set, streaming its stdout and
/// stderr to the terminal as it runs. Returns an error if the command exits
/// non-zero; the caller treats that as a failed rebuild, not a fatal error.
pub(super) async fn run_bundler(command: &str, base_dir: &Path) -> Result<()> {
  let started = Instant::now();
  println!("  {CYAN}[sxo]{RESET} rebuilding...");

  let mut child = Command::new("sh")
    .arg("-c")
    .arg(command)
    .current_dir(base_dir)
    .env("DEV", "true")
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .with_context(|| format!("failed to start bundler command `{command}`"))?;

  pipe_child_output(&mut child).await;

  let status = child.wait().await.context("bundler process failed")?;
  if status.success() {
    println!(
      "  {GREEN}[sxo]{RESET} rebuild complete ({:.1}s)",
      started.elapsed().as_secs_f64()
    );
    Ok(())
  } else {
    println!("  {RED}[sxo]{RESET} rebuild failed ({status})");
    anyhow::bail!("bundler command exited with {status}");
  }
}

async fn pipe_child_output(child: &mut tokio::process::Child) {
  use tokio::io::{AsyncBufReadExt, BufReader};

  if let Some(stdout) = child.stdout.take() {
    tokio::spawn(async move {
      let mut lines = BufReader::new(stdout).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        println!("  {DIM}{line}{RESET}");
      }
    });
  }
  if let Some(stderr) = child.stderr.take() {
    tokio::spawn(async move {
      let mut lines = BufReader::new(stderr).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        eprintln!("  {DIM}{line}{RESET}");
      }
    });
  }
}
