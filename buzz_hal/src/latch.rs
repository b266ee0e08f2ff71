//! Shared press latch.
//!
//! One `SharedLatch` is built by the orchestrator and handed by `Arc` to
//! every indicator unit and the reset unit. It is the only mutable state
//! shared across units and is lock-free: handlers run in interrupt context.

use std::sync::atomic::{AtomicBool, Ordering};

/// Observable latch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    /// No indicator lit; the next press wins.
    Idle,
    /// An indicator won; further presses are ignored until reset.
    Latched,
}

/// Process-wide press latch.
///
/// Transitions are `Idle → Latched` by exactly one [`try_claim`](Self::try_claim)
/// per idle period and `Latched → Idle` by [`clear`](Self::clear). The latch
/// remembers nothing else.
#[derive(Debug, Default)]
pub struct SharedLatch {
    pressed: AtomicBool,
}

impl SharedLatch {
    /// Create a latch in the `Idle` state.
    pub const fn new() -> Self {
        Self {
            pressed: AtomicBool::new(false),
        }
    }

    /// Atomically set the latch; returns `true` if this call moved it out of `Idle`.
    ///
    /// Among any number of concurrent callers between two clears, exactly
    /// one observes `true`.
    #[inline]
    pub fn try_claim(&self) -> bool {
        !self.pressed.swap(true, Ordering::SeqCst)
    }

    /// Unconditionally return the latch to `Idle`.
    #[inline]
    pub fn clear(&self) {
        self.pressed.store(false, Ordering::SeqCst);
    }

    /// Current state.
    pub fn state(&self) -> LatchState {
        if self.pressed.load(Ordering::SeqCst) {
            LatchState::Latched
        } else {
            LatchState::Idle
        }
    }

    /// Shorthand for `state() == LatchState::Latched`.
    pub fn is_latched(&self) -> bool {
        self.state() == LatchState::Latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_new_latch_is_idle() {
        let latch = SharedLatch::new();
        assert_eq!(latch.state(), LatchState::Idle);
        assert!(!latch.is_latched());
    }

    #[test]
    fn test_first_claim_wins_until_clear() {
        let latch = SharedLatch::new();
        assert!(latch.try_claim());
        assert!(!latch.try_claim());
        assert!(!latch.try_claim());
        assert_eq!(latch.state(), LatchState::Latched);

        latch.clear();
        assert_eq!(latch.state(), LatchState::Idle);
        assert!(latch.try_claim());
    }

    #[test]
    fn test_clear_when_idle_is_noop() {
        let latch = SharedLatch::new();
        latch.clear();
        latch.clear();
        assert_eq!(latch.state(), LatchState::Idle);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        const CONTENDERS: usize = 8;

        for _ in 0..200 {
            let latch = Arc::new(SharedLatch::new());
            let barrier = Arc::new(Barrier::new(CONTENDERS));

            let handles: Vec<_> = (0..CONTENDERS)
                .map(|_| {
                    let latch = Arc::clone(&latch);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        latch.try_claim()
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);
            assert!(latch.is_latched());
        }
    }
}
