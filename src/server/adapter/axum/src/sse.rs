/* src/server/adapter/axum/src/sse.rs */

//! The dev server's hot-replace hub (§4.H.3): a process-local registry of
//! connected browser tabs, each holding an SSE channel the output-directory
//! watcher broadcasts onto when files change.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use axum::response::sse::Event;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

struct SseClient {
  id: u64,
  sender: mpsc::UnboundedSender<Result<Event, Infallible>>,
}

/// Shared across every request handler; the only cross-request mutable
/// state the dev server carries (§5).
pub struct SseHub {
  clients: Mutex<Vec<SseClient>>,
  next_id: AtomicU64,
}

impl Default for SseHub {
  fn default() -> Self {
    SseHub::new()
  }
}

impl SseHub {
  pub fn new() -> Self {
    SseHub { clients: Mutex::new(Vec::new()), next_id: AtomicU64::new(1) }
  }

  /// Register a new client connection; returns the stream to hand back as
  /// the SSE response body. The client is removed once the stream's sender
  /// half is dropped or a broadcast write fails.
  pub fn register(&self) -> UnboundedReceiverStream<Result<Event, Infallible>> {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = mpsc::unbounded_channel();
    let opening = Event::default().comment("sxo-hot-replace-open");
    let _ = tx.send(Ok(opening));
    self.clients.lock().expect("sse client list lock poisoned").push(SseClient { id, sender: tx });
    UnboundedReceiverStream::new(rx)
  }

  /// Broadcast a changed-paths payload to every connected client, in
  /// registration order (§5 "within a single SSE client, messages are
  /// delivered in registration order"). Clients whose write fails are
  /// dropped from the registry.
  pub fn broadcast(&self, changed_paths: &[String]) {
    let payload = serde_json::json!({ "changed": changed_paths }).to_string();
    let mut clients = self.clients.lock().expect("sse client list lock poisoned");
    clients.retain(|client| {
      let event = Event::default().id(client.id.to_string()).retry(Duration::from_millis(250)).data(&payload);
      client.sender.send(Ok(event)).is_ok()
    });
  }

  pub fn client_count(&self) -> usize {
    self.clients.lock().expect("sse client list lock poisoned").len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_util::StreamExt;

  #[tokio::test]
  async fn register_emits_opening_comment() {
    let hub = SseHub::new();
    let mut stream = hub.register();
    let first = stream.next().await.unwrap().unwrap();
    assert!(format!("{first:?}").contains("sxo-hot-replace-open"));
  }

  #[tokio::test]
  async fn broadcast_reaches_registered_client() {
    let hub = SseHub::new();
    let mut stream = hub.register();
    stream.next().await; // drain the opening comment
    hub.broadcast(&["index.html".to_string()]);
    let event = stream.next().await.unwrap().unwrap();
    assert!(format!("{event:?}").contains("index.html"));
  }

  #[tokio::test]
  async fn dropped_receiver_is_pruned_on_next_broadcast() {
    let hub = SseHub::new();
    let surviving = hub.register();
    drop(hub.register());
    assert_eq!(hub.client_count(), 2);
    hub.broadcast(&["a.html".to_string()]);
    assert_eq!(hub.client_count(), 1);
    drop(surviving);
  }
}
