//! Socket Channels - named-channel multiplexing over one WebSocket.
//!
//! This library lets application code register handlers for named channels
//! and send named messages over a single connection to one peer, without
//! managing connection lifecycle, framing or delivery timing itself.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── Client ─────────────────────────────┐
//! │                                                                 │
//! │  send(ch, data) ──► Status? ──Connected──► encode ──► Transport │
//! │                        │                                        │
//! │                        └─otherwise─► Outbound Buffer            │
//! │                                       (flushed on open)         │
//! │                                                                 │
//! │  Transport text ──► Dispatcher ──► Handler Registry ──► handler │
//! │                     (decode, sentinel on failure)               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every frame is a JSON envelope: `{"where": "<channel>", "data": <any>}`.
//!
//! # Quick Start
//!
//! ```no_run
//! use socket_channels::{Client, ClientOptions, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::open("localhost", 9000, ClientOptions::default())?;
//!
//!     client.on("chat", |data| println!("chat: {data}"))?;
//!     client.set_disconnect_event(|| println!("peer went away"));
//!
//!     // Buffered until the connection opens, then sent in order.
//!     client.send("chat", &json!({ "msg": "hi" }))?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.close()?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`], [`ClientBuilder`], [`ClientOptions`], [`Status`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe channel and connection ids |
//! | [`protocol`] | Envelope format and text framing |
//! | [`transport`] | Transport capability and implementations |
//!
//! # Error Policy
//!
//! - Misuse of the API (missing host, double start, closing twice) fails
//!   immediately with an [`Error`].
//! - Malformed or unexpected input from the network never surfaces as an
//!   error; it is recovered inside the dispatcher.
//! - Transport failures are reported to the observers registered with
//!   [`Client::set_error_event`] and [`Client::set_disconnect_event`].

// ============================================================================
// Modules
// ============================================================================

/// Channel client.
///
/// - [`Client`] - lifecycle, sending, handler registration
/// - [`ClientBuilder`] - fluent configuration
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire protocol message types.
pub mod protocol;

/// Transport layer.
///
/// [`transport::WebSocketTransport`] is the default; implement
/// [`transport::Transport`] to plug in another.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    Client, ClientBuilder, ClientOptions, ErrorHandler, Handler, LifecycleHandler, Scheme, Status,
    WeakClient,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ChannelName, ConnectionId};

// Protocol types
pub use protocol::{Envelope, TextCodec};
