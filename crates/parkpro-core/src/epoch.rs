// ── View generations ──
//
// Each screen bumps its epoch when it (re)mounts or refreshes. Fetches
// are tagged with the generation current at dispatch; a response whose
// tag no longer matches belongs to a view that has since gone away and is
// dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque generation number handed out by [`ViewEpoch::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

/// Shared, cheaply cloneable generation counter for one screen.
#[derive(Debug, Clone, Default)]
pub struct ViewEpoch {
    counter: Arc<AtomicU64>,
}

impl ViewEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every earlier one.
    pub fn advance(&self) -> Generation {
        Generation(self.counter.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn current(&self) -> Generation {
        Generation(self.counter.load(Ordering::Relaxed))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }

    /// Hand back `value` only if `generation` is still current.
    pub fn accept<T>(&self, generation: Generation, value: T) -> Option<T> {
        self.is_current(generation).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_is_dropped() {
        let epoch = ViewEpoch::new();
        let first = epoch.advance();
        let second = epoch.advance();

        assert_eq!(epoch.accept(first, "old"), None);
        assert_eq!(epoch.accept(second, "new"), Some("new"));
    }

    #[test]
    fn clones_share_the_counter() {
        let epoch = ViewEpoch::new();
        let handle = epoch.clone();
        let generation = epoch.advance();
        handle.advance();
        assert!(!epoch.is_current(generation));
    }
}
