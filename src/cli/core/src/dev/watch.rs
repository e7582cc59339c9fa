/* src/cli/core/src/dev/watch.rs */

// Dual filesystem watcher for the dev server (§4.H.2): the page source tree
// triggers a bundler rebuild, the client output directory triggers a cache
// clear, manifest reload, and SSE broadcast so connected browsers refresh.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A `RecommendedWatcher` paired with the channel it feeds. The watcher must
/// stay alive for as long as events are wanted; dropping it stops watching.
/// Each event carries the paths it touched, relative to the watched root, so
/// callers can report which files actually changed (§4.H.3).
pub(super) struct SourceWatch {
  _watcher: RecommendedWatcher,
  pub rx: mpsc::Receiver<Vec<PathBuf>>,
}

/// Watch `dir` recursively, firing the event's touched paths (relative to
/// `dir`) on the returned receiver. The notify callback runs on its own
/// thread, so it feeds the channel with `blocking_send`.
pub(super) fn watch_dir(dir: &Path) -> Result<SourceWatch> {
  let (tx, rx) = mpsc::channel(16);
  let root = dir.to_path_buf();
  let mut watcher = RecommendedWatcher::new(
    move |res: std::result::Result<notify::Event, notify::Error>| {
      if let Ok(event) = res {
        let relative: Vec<PathBuf> = event
          .paths
          .iter()
          .map(|p| p.strip_prefix(&root).unwrap_or(p).to_path_buf())
          .collect();
        let _ = tx.blocking_send(relative);
      }
    },
    notify::Config::default(),
  )?;
  watcher.watch(dir, RecursiveMode::Recursive)?;
  Ok(SourceWatch { _watcher: watcher, rx })
}

/// Drain any events queued up right after `first`, so a burst of saves
/// (editor writing several files, a bundler's own output writes) collapses
/// into a single rebuild. Returns every distinct path touched across the
/// burst, formatted with forward slashes, in first-seen order.
pub(super) async fn debounce(rx: &mut mpsc::Receiver<Vec<PathBuf>>, first: Vec<PathBuf>) -> Vec<String> {
  tokio::time::sleep(Duration::from_millis(300)).await;
  let mut changed: Vec<String> = Vec::new();
  let mut push_all = |paths: Vec<PathBuf>| {
    for path in paths {
      let formatted = path.to_string_lossy().replace('\\', "/");
      if !changed.contains(&formatted) {
        changed.push(formatted);
      }
    }
  };
  push_all(first);
  while let Ok(paths) = rx.try_recv() {
    push_all(paths);
  }
  changed
}
