//! Handler registry.
//!
//! Maps each channel to at most one handler. Registering a channel again
//! replaces the previous handler.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::identifiers::ChannelName;

// ============================================================================
// Types
// ============================================================================

/// Channel handler callback.
///
/// Called with the envelope's `data` for every inbound message on the
/// channel it is registered for.
pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

// ============================================================================
// HandlerRegistry
// ============================================================================

/// Channel name → handler map.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: FxHashMap<ChannelName, Handler>,
}

impl HandlerRegistry {
    /// Registers `handler` for `channel`.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub(crate) fn insert(&mut self, channel: ChannelName, handler: Handler) -> bool {
        self.handlers.insert(channel, handler).is_some()
    }

    /// Removes the handler for `channel`.
    ///
    /// Returns `true` if one was registered.
    pub(crate) fn remove(&mut self, channel: &str) -> bool {
        self.handlers.remove(channel).is_some()
    }

    /// Returns the handler for `channel`.
    #[inline]
    pub(crate) fn get(&self, channel: &str) -> Option<Handler> {
        self.handlers.get(channel).cloned()
    }

    #[inline]
    pub(crate) fn contains(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    fn channel(name: &str) -> ChannelName {
        ChannelName::new(name).expect("valid")
    }

    fn recording(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Handler {
        let log = Arc::clone(log);
        Arc::new(move |_| log.lock().push(tag.to_string()))
    }

    #[test]
    fn test_last_registration_wins() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::default();

        assert!(!registry.insert(channel("ping"), recording(&log, "h1")));
        assert!(registry.insert(channel("ping"), recording(&log, "h2")));
        assert_eq!(registry.len(), 1);

        let handler = registry.get("ping").expect("registered");
        handler(Value::Null);
        assert_eq!(*log.lock(), vec!["h2"]);
    }

    #[test]
    fn test_remove_reports_presence() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::default();
        registry.insert(channel("ping"), recording(&log, "h"));

        assert!(registry.remove("ping"));
        assert!(!registry.remove("ping"));
        assert!(!registry.contains("ping"));
        assert!(registry.get("ping").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::default();
        registry.insert(channel("Ping"), recording(&log, "h"));

        assert!(registry.contains("Ping"));
        assert!(!registry.contains("ping"));
    }
}
