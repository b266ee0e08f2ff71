//! Simulated line bank.
//!
//! One `LineSlot` per line, all state in atomics so level changes from
//! interrupt handlers never take a lock.

use std::sync::atomic::{AtomicBool, Ordering};

/// State of one simulated line.
#[derive(Debug, Default)]
pub(crate) struct LineSlot {
    owned: AtomicBool,
    output: AtomicBool,
    level: AtomicBool,
    exposed: AtomicBool,
}

impl LineSlot {
    /// Try to take ownership. Inputs idle high (pulled up).
    pub(crate) fn claim(&self) -> bool {
        let claimed = self
            .owned
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if claimed {
            self.output.store(false, Ordering::SeqCst);
            self.level.store(true, Ordering::SeqCst);
        }
        claimed
    }

    /// Drop ownership; returns `false` if the slot was not owned.
    pub(crate) fn free(&self) -> bool {
        let was_owned = self.owned.swap(false, Ordering::SeqCst);
        self.exposed.store(false, Ordering::SeqCst);
        self.output.store(false, Ordering::SeqCst);
        was_owned
    }

    pub(crate) fn is_owned(&self) -> bool {
        self.owned.load(Ordering::SeqCst)
    }

    pub(crate) fn is_output(&self) -> bool {
        self.output.load(Ordering::SeqCst)
    }

    pub(crate) fn set_output(&self, output: bool) {
        self.output.store(output, Ordering::SeqCst);
        if output {
            self.level.store(false, Ordering::SeqCst);
        }
    }

    pub(crate) fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    pub(crate) fn set_level(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }

    pub(crate) fn is_exposed(&self) -> bool {
        self.exposed.load(Ordering::SeqCst)
    }

    pub(crate) fn set_exposed(&self, exposed: bool) {
        self.exposed.store(exposed, Ordering::SeqCst);
    }
}

/// Fixed bank of line slots indexed by line number.
#[derive(Debug)]
pub(crate) struct LineBank {
    slots: Vec<LineSlot>,
}

impl LineBank {
    pub(crate) fn new(line_count: u32) -> Self {
        Self {
            slots: (0..line_count).map(|_| LineSlot::default()).collect(),
        }
    }

    pub(crate) fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub(crate) fn get(&self, line: u32) -> Option<&LineSlot> {
        self.slots.get(line as usize)
    }

    /// Line numbers currently owned, ascending.
    pub(crate) fn owned(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_owned())
            .map(|(idx, _)| idx as u32)
    }
}
