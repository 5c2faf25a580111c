//! Registration handles

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique listener handles
static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

/// Handle returned when a listener is registered, used to unregister it later.
///
/// Handles are unique for the lifetime of the process, so a stale handle can
/// never remove a listener registered after it.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a fresh handle
    pub fn next() -> Self {
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_debug_format() {
        let id = ListenerId(7);
        assert_eq!(format!("{id:?}"), "ListenerId(7)");
        assert_eq!(id.to_string(), "7");
    }
}
