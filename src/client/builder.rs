//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and opening [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use socket_channels::Client;
//!
//! # async fn example() -> socket_channels::Result<()> {
//! let client = Client::builder()
//!     .host("localhost")
//!     .port(9000)
//!     .debug_logging(true)
//!     .build()?;
//!
//! client.send("chat", &serde_json::json!({ "msg": "hi" }))?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::protocol::TextCodec;
use crate::transport::Transport;

use super::core::Client;
use super::options::{ClientOptions, Scheme};

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`].
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Peer host name or address.
    host: Option<String>,
    /// Peer port.
    port: Option<u16>,
    /// Everything else.
    options: ClientOptions,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default options and no host or port.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the peer host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the peer port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the URL scheme.
    #[inline]
    #[must_use]
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.options.scheme = scheme;
        self
    }

    /// Sets the resource path.
    #[inline]
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.options.path = path.into();
        self
    }

    /// Sets whether the client connects on build.
    #[inline]
    #[must_use]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.options.auto_start = auto_start;
        self
    }

    /// Sets whether inbound diagnostics are logged at `warn`.
    #[inline]
    #[must_use]
    pub fn debug_logging(mut self, debug_logging: bool) -> Self {
        self.options.debug_logging = debug_logging;
        self
    }

    /// Sets whether buffered messages survive `close()`.
    #[inline]
    #[must_use]
    pub fn persist_buffer_across_reconnect(mut self, persist: bool) -> Self {
        self.options.persist_buffer_across_reconnect = persist;
        self
    }

    /// Sets the outbound framing.
    #[inline]
    #[must_use]
    pub fn outbound_codec(mut self, codec: TextCodec) -> Self {
        self.options.outbound_codec = codec;
        self
    }

    /// Sets the inbound framing.
    #[inline]
    #[must_use]
    pub fn inbound_codec(mut self, codec: TextCodec) -> Self {
        self.options.inbound_codec = codec;
        self
    }

    /// Sets the transport.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.options = self.options.with_transport(transport);
        self
    }

    /// Builds the client with validation.
    ///
    /// Connects immediately unless `auto_start` is off.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if host or port is missing or invalid
    /// - Any error from the transport if `auto_start` is on and the
    ///   connection attempt cannot be started
    pub fn build(self) -> Result<Client> {
        let host = self.validate_host()?;
        let port = self.validate_port()?;
        let url = self.options.url(&host, port)?;

        Client::new(url, self.options)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates the host configuration.
    fn validate_host(&self) -> Result<String> {
        let host = self.host.as_deref().map(str::trim).ok_or_else(|| {
            Error::invalid_argument(
                "host is required. Use .host() to set it.\n\
                 Example: Client::builder().host(\"localhost\")",
            )
        })?;

        if host.is_empty() {
            return Err(Error::invalid_argument("host must not be empty"));
        }

        Ok(host.to_string())
    }

    /// Validates the port configuration.
    fn validate_port(&self) -> Result<u16> {
        match self.port {
            None => Err(Error::invalid_argument(
                "port is required. Use .port() to set it.\n\
                 Example: Client::builder().port(9000)",
            )),
            Some(0) => Err(Error::invalid_argument("port must not be 0")),
            Some(port) => Ok(port),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::client::Status;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ClientBuilder::new();
        assert!(builder.host.is_none());
        assert!(builder.port.is_none());
        assert!(builder.options.auto_start);
    }

    #[test]
    fn test_setters() {
        let builder = ClientBuilder::new()
            .host("localhost")
            .port(9000)
            .scheme(Scheme::Wss)
            .path("/ws")
            .auto_start(false)
            .debug_logging(true)
            .persist_buffer_across_reconnect(true)
            .outbound_codec(TextCodec::PercentEncoded);

        assert_eq!(builder.host.as_deref(), Some("localhost"));
        assert_eq!(builder.port, Some(9000));
        assert_eq!(builder.options.scheme, Scheme::Wss);
        assert_eq!(builder.options.path, "/ws");
        assert!(!builder.options.auto_start);
        assert!(builder.options.debug_logging);
        assert!(builder.options.persist_buffer_across_reconnect);
        assert_eq!(builder.options.outbound_codec, TextCodec::PercentEncoded);
        assert_eq!(builder.options.inbound_codec, TextCodec::Plain);
    }

    #[test]
    fn test_build_fails_without_host() {
        let err = ClientBuilder::new().port(9000).build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_build_fails_with_blank_host() {
        let err = ClientBuilder::new().host("  ").port(9000).build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_build_fails_without_port() {
        let err = ClientBuilder::new().host("localhost").build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_build_fails_with_port_zero() {
        let err = ClientBuilder::new()
            .host("localhost")
            .port(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_build_without_auto_start() {
        let transport = MemoryTransport::new();
        let client = ClientBuilder::new()
            .host("localhost")
            .port(9000)
            .auto_start(false)
            .transport(transport.clone())
            .build()
            .expect("build");

        assert_eq!(client.status(), Status::Disconnected);
        assert_eq!(transport.connect_count(), 0);
    }

    #[test]
    fn test_build_with_auto_start_connects() {
        let transport = MemoryTransport::new();
        let client = ClientBuilder::new()
            .host("localhost")
            .port(9000)
            .path("/chat")
            .transport(transport.clone())
            .build()
            .expect("build");

        assert_eq!(client.status(), Status::Connecting);
        assert_eq!(
            transport.last_url().map(|u| u.to_string()),
            Some("ws://localhost:9000/chat".to_string())
        );
    }
}
