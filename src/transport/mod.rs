//! Transport layer.
//!
//! The client never touches a socket directly. It consumes a [`Transport`]
//! capability that opens one connection per `start()` and reports what
//! happens to it through an [`EventSink`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   connect(url, sink)   ┌──────────────────────┐
//! │     Client      │───────────────────────►│      Transport       │
//! │                 │                        │                      │
//! │  status/buffer  │◄───── EventSink ───────│  Open / Message /    │
//! │  registry       │                        │  Close / Error       │
//! │                 │── TransportHandle ────►│  send(text), close() │
//! └─────────────────┘                        └──────────────────────┘
//! ```
//!
//! # Contract
//!
//! - `connect` returns immediately; the connection attempt runs elsewhere.
//! - Events for one connection are emitted serially, never concurrently.
//! - Neither `connect` nor [`TransportHandle`] methods may emit events
//!   synchronously on the calling thread.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `memory` | In-process transport that records frames, for tests |
//! | `websocket` | `tokio-tungstenite` client transport |

// ============================================================================
// Submodules
// ============================================================================

/// In-process transport for tests and benchmarks.
pub mod memory;

/// WebSocket client transport.
pub mod websocket;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::MemoryTransport;
pub use websocket::WebSocketTransport;

// ============================================================================
// TransportEvent
// ============================================================================

/// Something that happened to a transport connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Open,
    /// Text frame received.
    Message(String),
    /// Connection closed by the peer or the network.
    Close,
    /// Connection failed.
    Error(String),
}

// ============================================================================
// EventSink
// ============================================================================

/// Callback target for [`TransportEvent`]s of a single connection.
///
/// Cheap to clone. Events emitted after the owning client has moved on
/// (closed, reconnected, or dropped) are discarded by the client.
#[derive(Clone)]
pub struct EventSink {
    deliver: Arc<dyn Fn(TransportEvent) + Send + Sync>,
}

impl EventSink {
    /// Creates a sink that forwards every event to `deliver`.
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(TransportEvent) + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Emits an event.
    #[inline]
    pub fn emit(&self, event: TransportEvent) {
        (self.deliver)(event);
    }

    /// Emits [`TransportEvent::Open`].
    #[inline]
    pub fn open(&self) {
        self.emit(TransportEvent::Open);
    }

    /// Emits [`TransportEvent::Message`].
    #[inline]
    pub fn message(&self, text: impl Into<String>) {
        self.emit(TransportEvent::Message(text.into()));
    }

    /// Emits [`TransportEvent::Close`].
    #[inline]
    pub fn close(&self) {
        self.emit(TransportEvent::Close);
    }

    /// Emits [`TransportEvent::Error`].
    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.emit(TransportEvent::Error(message.into()));
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Factory for connections to a single peer.
///
/// Object-safe; clients hold it as `Arc<dyn Transport>`.
pub trait Transport: Send + Sync + 'static {
    /// Begins connecting to `url`.
    ///
    /// Must return without waiting for the connection. Progress is reported
    /// through `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot even be started.
    fn connect(&self, url: &Url, sink: EventSink) -> Result<Box<dyn TransportHandle>>;
}

/// Handle to one open (or opening) connection.
pub trait TransportHandle: Send {
    /// Hands a text frame to the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection can no longer accept frames.
    fn send(&self, text: String) -> Result<()>;

    /// Closes the connection. Called at most once per handle.
    fn close(&self);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    #[test]
    fn test_event_sink_forwards_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink = EventSink::new(move |event| seen_clone.lock().push(event));

        sink.open();
        sink.message("hello");
        sink.error("reset");
        sink.close();

        assert_eq!(
            *seen.lock(),
            vec![
                TransportEvent::Open,
                TransportEvent::Message("hello".to_string()),
                TransportEvent::Error("reset".to_string()),
                TransportEvent::Close,
            ]
        );
    }

    #[test]
    fn test_event_sink_clone_shares_target() {
        let seen = Arc::new(Mutex::new(0usize));
        let seen_clone = Arc::clone(&seen);
        let sink = EventSink::new(move |_| *seen_clone.lock() += 1);

        let cloned = sink.clone();
        sink.open();
        cloned.close();

        assert_eq!(*seen.lock(), 2);
    }
}
