//! Client configuration options.
//!
//! # Example
//!
//! ```
//! use socket_channels::{ClientOptions, Scheme};
//!
//! let options = ClientOptions::new()
//!     .with_scheme(Scheme::Wss)
//!     .with_path("/socket")
//!     .with_auto_start(false)
//!     .with_debug_logging(true);
//!
//! assert!(!options.auto_start);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::{Error, Result};
use crate::protocol::TextCodec;
use crate::transport::{Transport, WebSocketTransport};

// ============================================================================
// Scheme
// ============================================================================

/// URL scheme used to reach the peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    /// Plain WebSocket (`ws://`).
    #[default]
    Ws,
    /// WebSocket over TLS (`wss://`).
    Wss,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ClientOptions
// ============================================================================

/// Options applied when a client is opened.
///
/// Host and port are passed separately to
/// [`Client::open`](crate::Client::open) or set on the
/// [`ClientBuilder`](crate::ClientBuilder).
#[derive(Clone)]
pub struct ClientOptions {
    /// URL scheme.
    pub scheme: Scheme,

    /// Resource path appended after `host:port`.
    pub path: String,

    /// Connect immediately when the client is created.
    pub auto_start: bool,

    /// Log undecodable and unroutable inbound messages at `warn`.
    pub debug_logging: bool,

    /// Keep buffered messages across `close()` and replay them on the next
    /// `start()`.
    pub persist_buffer_across_reconnect: bool,

    /// Framing applied to outbound text.
    pub outbound_codec: TextCodec,

    /// Framing expected on inbound text.
    pub inbound_codec: TextCodec,

    /// Connection factory.
    pub transport: Arc<dyn Transport>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::Ws,
            path: "/".to_string(),
            auto_start: true,
            debug_logging: false,
            persist_buffer_across_reconnect: false,
            outbound_codec: TextCodec::Plain,
            inbound_codec: TextCodec::Plain,
            transport: Arc::new(WebSocketTransport::new()),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("scheme", &self.scheme)
            .field("path", &self.path)
            .field("auto_start", &self.auto_start)
            .field("debug_logging", &self.debug_logging)
            .field(
                "persist_buffer_across_reconnect",
                &self.persist_buffer_across_reconnect,
            )
            .field("outbound_codec", &self.outbound_codec)
            .field("inbound_codec", &self.inbound_codec)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL scheme.
    #[inline]
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the resource path.
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets whether the client connects on creation.
    #[inline]
    #[must_use]
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Sets whether inbound diagnostics are logged at `warn`.
    #[inline]
    #[must_use]
    pub fn with_debug_logging(mut self, debug_logging: bool) -> Self {
        self.debug_logging = debug_logging;
        self
    }

    /// Sets whether buffered messages survive `close()`.
    #[inline]
    #[must_use]
    pub fn with_persist_buffer_across_reconnect(mut self, persist: bool) -> Self {
        self.persist_buffer_across_reconnect = persist;
        self
    }

    /// Sets the outbound framing.
    #[inline]
    #[must_use]
    pub fn with_outbound_codec(mut self, codec: TextCodec) -> Self {
        self.outbound_codec = codec;
        self
    }

    /// Sets the inbound framing.
    #[inline]
    #[must_use]
    pub fn with_inbound_codec(mut self, codec: TextCodec) -> Self {
        self.inbound_codec = codec;
        self
    }

    /// Percent-encodes outbound text and percent-decodes inbound text.
    #[inline]
    #[must_use]
    pub fn with_percent_encoding(self) -> Self {
        self.with_outbound_codec(TextCodec::PercentEncoded)
            .with_inbound_codec(TextCodec::PercentEncoded)
    }

    /// Sets the transport.
    #[inline]
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.transport = Arc::new(transport);
        self
    }
}

// ============================================================================
// URL
// ============================================================================

impl ClientOptions {
    /// Builds the peer URL for `host` and `port`.
    ///
    /// IPv6 literals are bracketed and a missing leading `/` on the path is
    /// added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the result is not a valid URL.
    pub fn url(&self, host: &str, port: u16) -> Result<Url> {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        let raw = format!("{}://{}:{}{}", self.scheme, host, port, path);
        Url::parse(&raw).map_err(|e| Error::invalid_argument(format!("invalid URL {raw}: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.scheme, Scheme::Ws);
        assert_eq!(options.path, "/");
        assert!(options.auto_start);
        assert!(!options.debug_logging);
        assert!(!options.persist_buffer_across_reconnect);
        assert_eq!(options.outbound_codec, TextCodec::Plain);
        assert_eq!(options.inbound_codec, TextCodec::Plain);
    }

    #[test]
    fn test_builder_chain() {
        let options = ClientOptions::new()
            .with_scheme(Scheme::Wss)
            .with_auto_start(false)
            .with_debug_logging(true)
            .with_persist_buffer_across_reconnect(true)
            .with_percent_encoding();

        assert_eq!(options.scheme, Scheme::Wss);
        assert!(!options.auto_start);
        assert!(options.debug_logging);
        assert!(options.persist_buffer_across_reconnect);
        assert_eq!(options.outbound_codec, TextCodec::PercentEncoded);
        assert_eq!(options.inbound_codec, TextCodec::PercentEncoded);
    }

    #[test]
    fn test_url_default_path() {
        let url = ClientOptions::default().url("localhost", 9000).expect("url");
        assert_eq!(url.as_str(), "ws://localhost:9000/");
    }

    #[test]
    fn test_url_scheme_and_path() {
        let url = ClientOptions::new()
            .with_scheme(Scheme::Wss)
            .with_path("chat")
            .url("example.com", 443)
            .expect("url");
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/chat");
    }

    #[test]
    fn test_url_ipv6_host() {
        let url = ClientOptions::default().url("::1", 9000).expect("url");
        assert_eq!(url.as_str(), "ws://[::1]:9000/");
    }

    #[test]
    fn test_url_rejects_bad_host() {
        let result = ClientOptions::default().url("bad host", 9000);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_scheme_as_str() {
        assert_eq!(Scheme::Ws.as_str(), "ws");
        assert_eq!(Scheme::Wss.to_string(), "wss");
    }

    #[test]
    fn test_debug_omits_transport() {
        let text = format!("{:?}", ClientOptions::default());
        assert!(text.contains("auto_start: true"));
        assert!(!text.contains("transport"));
    }
}
