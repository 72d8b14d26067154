//! Connection status state machine.
//!
//! ```text
//!                start()              transport Open
//! Disconnected ─────────► Connecting ───────────────► Connected
//!      ▲                      │                           │
//!      └──────────────────────┴───────────────────────────┘
//!              transport Close / Error, or close()
//! ```
//!
//! Leaving `Disconnected` is only possible through `start()`; every other
//! transition is driven by the transport or by `close()`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Status
// ============================================================================

/// Connection status of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// No transport connection. Initial state.
    #[default]
    Disconnected,
    /// Transport connection requested, not yet open.
    Connecting,
    /// Transport connection open; sends go straight out.
    Connected,
}

impl Status {
    /// Returns the lowercase name of the status.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// StatusTracker
// ============================================================================

/// Owns the status and enforces legal transitions.
#[derive(Debug, Default)]
pub(crate) struct StatusTracker {
    status: Status,
}

impl StatusTracker {
    /// Returns the current status.
    #[inline]
    pub(crate) fn get(&self) -> Status {
        self.status
    }

    /// `Disconnected` → `Connecting`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyOpen`] from any other state.
    pub(crate) fn begin_connect(&mut self) -> Result<()> {
        if self.status != Status::Disconnected {
            return Err(Error::already_open(self.status));
        }
        self.status = Status::Connecting;
        Ok(())
    }

    /// `Connecting` → `Connected`.
    ///
    /// Returns `false` (and changes nothing) from any other state.
    pub(crate) fn mark_connected(&mut self) -> bool {
        if self.status != Status::Connecting {
            return false;
        }
        self.status = Status::Connected;
        true
    }

    /// Any state → `Disconnected`.
    ///
    /// Returns the previous status, or `None` if already disconnected.
    pub(crate) fn mark_disconnected(&mut self) -> Option<Status> {
        if self.status == Status::Disconnected {
            return None;
        }
        let previous = self.status;
        self.status = Status::Disconnected;
        Some(previous)
    }
}

// ============================================================================
// Tests
// ============================================================================
