//! In-process transport.
//!
//! [`MemoryTransport`] records every frame handed to it and lets the caller
//! play the peer: open the connection, deliver frames, drop or fail it.
//! Nothing happens on its own, which makes client behaviour deterministic
//! under test.
//!
//! # Example
//!
//! ```
//! use socket_channels::{Client, ClientOptions, Status};
//! use socket_channels::transport::MemoryTransport;
//!
//! # fn main() -> socket_channels::Result<()> {
//! let transport = MemoryTransport::new();
//! let options = ClientOptions::default().with_transport(transport.clone());
//! let client = Client::open("localhost", 9000, options)?;
//!
//! client.send("chat", &"hi")?;
//! assert_eq!(client.status(), Status::Connecting);
//!
//! transport.open();
//! assert_eq!(transport.sent(), vec![r#"{"where":"chat","data":"hi"}"#]);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use crate::error::{Error, Result};

use super::{EventSink, Transport, TransportEvent, TransportHandle};

// ============================================================================
// Types
// ============================================================================

/// One recorded connection.
struct MemoryConnection {
    /// URL passed to `connect`.
    url: Url,
    /// Sink for this connection's events.
    sink: EventSink,
    /// Frames handed to the handle, in order.
    sent: Vec<String>,
    /// Number of `close()` calls on the handle.
    close_calls: usize,
}

/// Shared state behind all clones of a [`MemoryTransport`].
#[derive(Default)]
struct MemoryState {
    connections: Vec<MemoryConnection>,
    fail_sends: bool,
}

// ============================================================================
// MemoryTransport
// ============================================================================

/// Recording transport driven by the test.
///
/// Clones share state, so one clone can be handed to the client while the
/// test keeps another. Peer-side methods act on the most recent connection.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    /// Creates an empty transport.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `send` fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }

    /// Returns how many connections have been opened.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.state.lock().connections.len()
    }

    /// Returns the URL of the most recent connection.
    #[must_use]
    pub fn last_url(&self) -> Option<Url> {
        self.state.lock().connections.last().map(|c| c.url.clone())
    }

    /// Returns frames sent on the most recent connection.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.state
            .lock()
            .connections
            .last()
            .map(|c| c.sent.clone())
            .unwrap_or_default()
    }

    /// Returns frames sent across all connections, in order.
    #[must_use]
    pub fn all_sent(&self) -> Vec<String> {
        self.state
            .lock()
            .connections
            .iter()
            .flat_map(|c| c.sent.iter().cloned())
            .collect()
    }

    /// Forgets frames recorded on every connection.
    pub fn clear_sent(&self) {
        for connection in &mut self.state.lock().connections {
            connection.sent.clear();
        }
    }

    /// Returns how many times the most recent handle was closed.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.state
            .lock()
            .connections
            .last()
            .map_or(0, |c| c.close_calls)
    }

    /// Returns the sink of connection `index` (0-based, in connect order).
    #[must_use]
    pub fn sink(&self, index: usize) -> Option<EventSink> {
        self.state
            .lock()
            .connections
            .get(index)
            .map(|c| c.sink.clone())
    }

    /// Emits `event` on the most recent connection.
    ///
    /// Does nothing if no connection was opened.
    pub fn emit(&self, event: TransportEvent) {
        // Clone the sink out so the client may call back into the handle.
        let sink = self.state.lock().connections.last().map(|c| c.sink.clone());
        if let Some(sink) = sink {
            sink.emit(event);
        }
    }

    /// Completes the handshake on the most recent connection.
    pub fn open(&self) {
        self.emit(TransportEvent::Open);
    }

    /// Delivers a text frame on the most recent connection.
    pub fn deliver(&self, text: impl Into<String>) {
        self.emit(TransportEvent::Message(text.into()));
    }

    /// Closes the most recent connection from the peer side.
    pub fn drop_connection(&self) {
        self.emit(TransportEvent::Close);
    }

    /// Fails the most recent connection.
    pub fn fail(&self, message: impl Into<String>) {
        self.emit(TransportEvent::Error(message.into()));
    }
}

impl Transport for MemoryTransport {
    fn connect(&self, url: &Url, sink: EventSink) -> Result<Box<dyn TransportHandle>> {
        let mut state = self.state.lock();
        state.connections.push(MemoryConnection {
            url: url.clone(),
            sink,
            sent: Vec::new(),
            close_calls: 0,
        });

        Ok(Box::new(MemoryHandle {
            state: Arc::clone(&self.state),
            index: state.connections.len() - 1,
        }))
    }
}

// ============================================================================
// MemoryHandle
// ============================================================================

/// Handle that appends to its connection's record.
struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
    index: usize,
}

impl TransportHandle for MemoryHandle {
    fn send(&self, text: String) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_sends {
            return Err(Error::connection("memory transport rejected frame"));
        }
        if let Some(connection) = state.connections.get_mut(self.index) {
            connection.sent.push(text);
        }
        Ok(())
    }

    fn close(&self) {
        if let Some(connection) = self.state.lock().connections.get_mut(self.index) {
            connection.close_calls += 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("ws://localhost:9000/").expect("url")
    }

    #[test]
    fn test_records_sent_frames() {
        let transport = MemoryTransport::new();
        let handle = transport
            .connect(&url(), EventSink::new(|_| {}))
            .expect("connect");

        handle.send("a".to_string()).expect("send");
        handle.send("b".to_string()).expect("send");

        assert_eq!(transport.connect_count(), 1);
        assert_eq!(transport.sent(), vec!["a", "b"]);
        assert_eq!(transport.last_url(), Some(url()));
    }

    #[test]
    fn test_clear_sent() {
        let transport = MemoryTransport::new();
        let handle = transport
            .connect(&url(), EventSink::new(|_| {}))
            .expect("connect");

        handle.send("a".to_string()).expect("send");
        transport.clear_sent();
        assert!(transport.all_sent().is_empty());
    }

    #[test]
    fn test_fail_sends() {
        let transport = MemoryTransport::new();
        let handle = transport
            .connect(&url(), EventSink::new(|_| {}))
            .expect("connect");

        transport.set_fail_sends(true);
        assert!(handle.send("a".to_string()).is_err());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_counts_close_calls() {
        let transport = MemoryTransport::new();
        let handle = transport
            .connect(&url(), EventSink::new(|_| {}))
            .expect("connect");

        handle.close();
        assert_eq!(transport.close_calls(), 1);
    }

    #[test]
    fn test_emit_targets_latest_connection() {
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let transport = MemoryTransport::new();

        let first_clone = Arc::clone(&first);
        let _h1 = transport
            .connect(&url(), EventSink::new(move |e| first_clone.lock().push(e)))
            .expect("connect");
        let second_clone = Arc::clone(&second);
        let _h2 = transport
            .connect(&url(), EventSink::new(move |e| second_clone.lock().push(e)))
            .expect("connect");

        transport.open();

        assert!(first.lock().is_empty());
        assert_eq!(*second.lock(), vec![TransportEvent::Open]);
    }

    #[test]
    fn test_emit_without_connection_is_noop() {
        let transport = MemoryTransport::new();
        transport.open();
        assert_eq!(transport.connect_count(), 0);
    }
}
