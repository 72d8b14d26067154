//! Type-safe identifiers.
//!
//! Newtype wrappers keep channel names and connection generations from
//! being mixed up with arbitrary strings and integers.
//!
//! | Type | Wraps | Notes |
//! |------|-------|-------|
//! | [`ChannelName`] | `String` | Non-empty, case-sensitive |
//! | [`ConnectionId`] | `u64` | Monotonic per client, one per transport open |

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

// ============================================================================
// ChannelName
// ============================================================================

/// Name of a logical channel multiplexed over the connection.
///
/// Serialized as the envelope's `where` field. Inbound names go through
/// [`ChannelName::new`] so an empty name can never be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Channel that undecodable inbound messages are routed to.
    pub const SENTINEL: &'static str = "null";

    /// Creates a channel name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("channel name must not be empty"));
        }
        Ok(Self(name))
    }

    /// Returns the sentinel channel name.
    #[inline]
    #[must_use]
    pub fn sentinel() -> Self {
        Self(Self::SENTINEL.to_string())
    }

    /// Returns `true` if this is the sentinel channel.
    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.0 == Self::SENTINEL
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChannelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

// ============================================================================
// ConnectionId
// ============================================================================

/// Generation number of a transport connection.
///
/// Every `start()` allocates the next id. Events tagged with an id other
/// than the current one belong to a torn-down connection and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Returns the id that follows this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw generation number.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
