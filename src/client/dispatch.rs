//! Inbound message dispatch.
//!
//! Turns raw transport text into a handler invocation. Nothing arriving
//! from the network can make dispatch fail: undecodable text becomes a
//! message on the sentinel channel, and a message for a channel with no
//! handler is dropped. Both conditions are logged at `warn` when debug
//! logging is enabled and at `trace` otherwise.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::{trace, warn};

use crate::protocol::{Envelope, TextCodec};

use super::registry::{Handler, HandlerRegistry};

// ============================================================================
// Route
// ============================================================================

/// Outcome of routing one inbound message.
pub(crate) enum Route {
    /// Invoke `handler` with `data`.
    Deliver { handler: Handler, data: Value },
    /// No handler registered for the channel.
    Unroutable,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Decodes inbound text and resolves its handler.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Dispatcher {
    /// Framing expected on inbound text.
    codec: TextCodec,
    /// Emit diagnostics at `warn` instead of `trace`.
    debug_logging: bool,
}

impl Dispatcher {
    pub(crate) fn new(codec: TextCodec, debug_logging: bool) -> Self {
        Self {
            codec,
            debug_logging,
        }
    }

    /// Decodes `text`, substituting the sentinel envelope on failure.
    pub(crate) fn decode(&self, text: &str) -> Envelope {
        let decoded = self
            .codec
            .unframe(text)
            .and_then(|plain| Envelope::decode(&plain));

        match decoded {
            Ok(envelope) => envelope,
            Err(e) => {
                if self.debug_logging {
                    warn!(error = %e, text, "Undecodable message, routing to sentinel channel");
                } else {
                    trace!(error = %e, "Undecodable message, routing to sentinel channel");
                }
                Envelope::sentinel()
            }
        }
    }

    /// Resolves the handler for `text`.
    ///
    /// The handler is returned rather than invoked so the caller can release
    /// its locks first.
    pub(crate) fn route(&self, registry: &HandlerRegistry, text: &str) -> Route {
        let envelope = self.decode(text);

        match registry.get(envelope.channel.as_str()) {
            Some(handler) => {
                trace!(channel = %envelope.channel, "Dispatching message");
                Route::Deliver {
                    handler,
                    data: envelope.data,
                }
            }
            None => {
                if self.debug_logging {
                    warn!(channel = %envelope.channel, "No handler for channel");
                } else {
                    trace!(channel = %envelope.channel, "No handler for channel");
                }
                Route::Unroutable
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
