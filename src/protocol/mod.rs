//! Wire protocol message types.
//!
//! Every frame exchanged with the peer is a JSON envelope naming the
//! channel it belongs to:
//!
//! ```json
//! { "where": "chat", "data": { "msg": "hi" } }
//! ```
//!
//! | Field | Type | Purpose |
//! |-------|------|---------|
//! | `where` | string | Channel name, routes to a registered handler |
//! | `data` | any JSON | Payload, opaque to this crate |
//!
//! No other top-level shape is produced or accepted. Text that does not
//! decode as an envelope is routed to the sentinel channel
//! ([`ChannelName::SENTINEL`](crate::identifiers::ChannelName::SENTINEL)).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `codec` | Text framing (plain or percent-encoded) |
//! | `envelope` | Envelope type, encode and decode |

// ============================================================================
// Submodules
// ============================================================================

/// Text framing applied around encoded envelopes.
pub mod codec;

/// Envelope type and JSON encoding.
pub mod envelope;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::TextCodec;
pub use envelope::Envelope;
