//! Outbound buffer for envelopes sent before the connection is open.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use crate::protocol::Envelope;

// ============================================================================
// OutboundBuffer
// ============================================================================

/// FIFO of envelopes awaiting a connected transport.
///
/// Unbounded. Append-only until [`drain`](Self::drain) empties it.
#[derive(Debug, Default)]
pub(crate) struct OutboundBuffer {
    pending: VecDeque<Envelope>,
}

impl OutboundBuffer {
    /// Appends an envelope.
    #[inline]
    pub(crate) fn push(&mut self, envelope: Envelope) {
        self.pending.push_back(envelope);
    }

    /// Removes and returns every pending envelope, oldest first.
    #[inline]
    pub(crate) fn drain(&mut self) -> VecDeque<Envelope> {
        std::mem::take(&mut self.pending)
    }

    /// Discards every pending envelope.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    /// Returns the number of pending envelopes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::ChannelName;

    fn envelope(channel: &str, n: i64) -> Envelope {
        Envelope::new(ChannelName::new(channel).expect("valid"), json!(n))
    }

    #[test]
    fn test_drain_is_fifo_and_empties() {
        let mut buffer = OutboundBuffer::default();
        buffer.push(envelope("a", 1));
        buffer.push(envelope("b", 2));
        buffer.push(envelope("a", 3));
        assert_eq!(buffer.len(), 3);

        let drained: Vec<_> = buffer.drain().into_iter().map(|e| e.data).collect();
        assert_eq!(drained, vec![json!(1), json!(2), json!(3)]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = OutboundBuffer::default();
        buffer.push(envelope("a", 1));
        buffer.clear();
        assert_eq!(buffer.len(), 0);
    }
}
