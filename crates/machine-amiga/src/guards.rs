//! Breakpoint and watchpoint lists.

use emu_core::Guard;

#[derive(Debug, Clone)]
struct Slot {
    addr: u32,
    enabled: bool,
    condition: Option<String>,
    hits: u64,
}

/// An ordered list of guards. Slots are positional: removing one shifts
/// every later slot down.
#[derive(Debug, Clone, Default)]
pub struct GuardList {
    slots: Vec<Slot>,
}

impl GuardList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Guard> {
        self.slots
            .iter()
            .map(|s| Guard {
                addr: s.addr,
                enabled: s.enabled,
                conditional: s.condition.is_some(),
            })
            .collect()
    }

    pub fn add(&mut self, addr: u32) {
        self.slots.push(Slot {
            addr,
            enabled: true,
            condition: None,
            hits: 0,
        });
    }

    pub fn remove(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.slots.remove(slot);
        }
    }

    pub fn set_enabled(&mut self, slot: usize, enabled: bool) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.enabled = enabled;
        }
    }

    /// Attach or clear a condition expression.
    pub fn set_condition(&mut self, slot: usize, condition: Option<String>) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.condition = condition;
        }
    }

    #[must_use]
    pub fn condition(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).and_then(|s| s.condition.as_deref())
    }

    /// Record a hit at `addr`. Returns true if an enabled guard is there.
    pub fn hit(&mut self, addr: u32) -> bool {
        let mut stop = false;
        for s in self.slots.iter_mut().filter(|s| s.addr == addr) {
            s.hits += 1;
            stop |= s.enabled;
        }
        stop
    }

    #[must_use]
    pub fn hits(&self, slot: usize) -> u64 {
        self.slots.get(slot).map_or(0, |s| s.hits)
    }
}
