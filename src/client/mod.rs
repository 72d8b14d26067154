//! Channel client module.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Lifecycle, sending, handler registration |
//! | [`WeakClient`] | Non-owning handle for use inside handlers |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientOptions`] | Connection and behaviour options |
//! | [`Status`] | Connection status |
//!
//! Internally the client is split into a status tracker, an outbound
//! buffer, a handler registry and a dispatcher, all owned by one
//! [`Client`] and guarded by a single lock.

// ============================================================================
// Submodules
// ============================================================================

/// Outbound buffer for messages sent before the connection opens.
mod buffer;

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Client lifecycle and transport event handling.
pub mod core;

/// Inbound decoding and routing.
mod dispatch;

/// Client options.
pub mod options;

/// Channel handler registry.
pub mod registry;

/// Connection status state machine.
pub mod status;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::{Client, ErrorHandler, LifecycleHandler, WeakClient};
pub use options::{ClientOptions, Scheme};
pub use registry::Handler;
pub use status::Status;
