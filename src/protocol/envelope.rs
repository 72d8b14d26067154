//! Envelope message type.
//!
//! An [`Envelope`] is the only unit exchanged over the connection. Outbound
//! payloads are converted to a [`Value`] at send time so that encode
//! failures surface to the caller before anything is buffered.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::ChannelName;

// ============================================================================
// Envelope
// ============================================================================

/// A channel-addressed message.
///
/// # Format
///
/// ```json
/// {
///   "where": "channel",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Target channel.
    #[serde(rename = "where")]
    pub channel: ChannelName,

    /// Payload, opaque to the dispatcher.
    pub data: Value,
}

/// Shape accepted from the wire before the channel name is validated.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "where")]
    channel: String,
    data: Value,
}

impl Envelope {
    /// Creates an envelope from an already-converted payload.
    #[inline]
    #[must_use]
    pub fn new(channel: ChannelName, data: Value) -> Self {
        Self { channel, data }
    }

    /// Creates an envelope by serializing `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `payload` cannot be represented as JSON.
    pub fn from_payload<T>(channel: ChannelName, payload: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(payload).map_err(Error::Encode)?;
        Ok(Self { channel, data })
    }

    /// Envelope delivered to the sentinel channel for undecodable input.
    #[inline]
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            channel: ChannelName::sentinel(),
            data: Value::Object(Map::new()),
        }
    }

    /// Serializes the envelope to JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// Parses JSON text into an envelope.
    ///
    /// Both `where` and `data` must be present and `where` must be a
    /// non-empty string. Unknown extra fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed JSON, a non-object top level,
    /// missing fields or an empty channel name.
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawEnvelope =
            serde_json::from_str(text).map_err(|e| Error::decode(e.to_string()))?;

        let channel = ChannelName::new(raw.channel)
            .map_err(|_| Error::decode("envelope names an empty channel"))?;

        Ok(Self {
            channel,
            data: raw.data,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
