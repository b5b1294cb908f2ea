//! Breakpoint and watchpoint registry views.
//!
//! The engine owns the guard lists. A registry keeps a read-through
//! snapshot for display and routes edits through one lock acquisition
//! each. The snapshot is re-read after the lock is dropped.

use emu_core::{DebugTarget, Guard, GuardKind};

use crate::address::Address;
use crate::engine::EngineHandle;
use crate::error::DebuggerError;
use crate::trace;

/// One engine slot as last read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct GuardEntry {
    pub slot: usize,
    pub address: Address,
    pub enabled: bool,
    pub conditional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStyle {
    ReadOnly,
    /// Ends with an "add address" row.
    Editable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub enum RegistryRow {
    Entry(GuardEntry),
    AddNew,
}

pub struct Registry<T> {
    engine: EngineHandle<T>,
    kind: GuardKind,
    style: RegistryStyle,
    entries: Vec<GuardEntry>,
}

impl<T: DebugTarget> Registry<T> {
    pub fn new(engine: EngineHandle<T>, kind: GuardKind, style: RegistryStyle) -> Self {
        Self {
            engine,
            kind,
            style,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    /// Re-read every slot from the engine.
    pub fn list(&mut self) -> Vec<GuardEntry> {
        let kind = self.kind;
        let guards = self.engine.with(|t| t.guards(kind));
        self.entries = entries_of(&guards);
        self.entries.clone()
    }

    /// Last snapshot, without touching the engine.
    #[must_use]
    pub fn entries(&self) -> &[GuardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn rows(&self) -> Vec<RegistryRow> {
        self.rows_of(&self.entries)
    }

    /// Rows for guard lists read elsewhere, leaving the cached snapshot as is.
    pub(crate) fn rows_from(&self, guards: &[Guard]) -> Vec<RegistryRow> {
        self.rows_of(&entries_of(guards))
    }

    fn rows_of(&self, entries: &[GuardEntry]) -> Vec<RegistryRow> {
        let mut rows: Vec<_> = entries.iter().copied().map(RegistryRow::Entry).collect();
        if self.style == RegistryStyle::Editable {
            rows.push(RegistryRow::AddNew);
        }
        rows
    }

    pub fn toggle_enabled(&mut self, slot: usize) -> Result<(), DebuggerError> {
        let kind = self.kind;
        self.engine.with_mut(|t| {
            let guards = t.guards(kind);
            let guard = guards.get(slot).ok_or(DebuggerError::SlotOutOfRange {
                slot,
                count: guards.len(),
            })?;
            t.set_guard_enabled(kind, slot, !guard.enabled);
            Ok(())
        })?;
        self.log("toggled slot", slot);
        self.list();
        Ok(())
    }

    pub fn set_enabled(&mut self, slot: usize, enabled: bool) -> Result<(), DebuggerError> {
        let kind = self.kind;
        self.engine.with_mut(|t| {
            let count = t.guard_count(kind);
            if slot >= count {
                return Err(DebuggerError::SlotOutOfRange { slot, count });
            }
            t.set_guard_enabled(kind, slot, enabled);
            Ok(())
        })?;
        self.list();
        Ok(())
    }

    pub fn add(&mut self, address: Address) -> Result<(), DebuggerError> {
        let kind = self.kind;
        self.engine.with_mut(|t| {
            if t.guard_at(kind, address.get()).is_some() {
                return Err(DebuggerError::DuplicateBreakpoint(address.get()));
            }
            t.add_guard(kind, address.get());
            Ok(())
        })?;
        self.log("added", address);
        self.list();
        Ok(())
    }

    /// Delete a slot. Later slots shift down, so the whole snapshot is
    /// re-read rather than patched.
    pub fn remove(&mut self, slot: usize) -> Result<(), DebuggerError> {
        let kind = self.kind;
        self.engine.with_mut(|t| {
            let count = t.guard_count(kind);
            if slot >= count {
                return Err(DebuggerError::SlotOutOfRange { slot, count });
            }
            t.remove_guard(kind, slot);
            Ok(())
        })?;
        self.log("removed slot", slot);
        self.list();
        Ok(())
    }

    #[must_use]
    pub fn has_entry_at(&self, address: Address) -> bool {
        let kind = self.kind;
        self.engine.with(|t| t.guard_at(kind, address.get()).is_some())
    }

    #[must_use]
    pub fn entry_at(&self, address: Address) -> Option<GuardEntry> {
        let kind = self.kind;
        self.engine.with(|t| {
            t.guards(kind)
                .into_iter()
                .enumerate()
                .find(|(_, g)| g.addr == address.get())
                .map(|(slot, g)| GuardEntry {
                    slot,
                    address,
                    enabled: g.enabled,
                    conditional: g.conditional,
                })
        })
    }

    /// Single click in the instruction list: set, then enable, then
    /// disable.
    pub fn toggle_at(&mut self, address: Address) {
        let kind = self.kind;
        self.engine.with_mut(|t| {
            let guards = t.guards(kind);
            match guards.iter().enumerate().find(|(_, g)| g.addr == address.get()) {
                Some((slot, guard)) => t.set_guard_enabled(kind, slot, !guard.enabled),
                None => t.add_guard(kind, address.get()),
            }
        });
        self.log("toggled", address);
        self.list();
    }

    /// Double click: remove whatever is there, or set a new one.
    pub fn add_or_remove_at(&mut self, address: Address) {
        let kind = self.kind;
        self.engine.with_mut(|t| {
            match t.guards(kind).iter().position(|g| g.addr == address.get()) {
                Some(slot) => t.remove_guard(kind, slot),
                None => t.add_guard(kind, address.get()),
            }
        });
        self.log("add/remove", address);
        self.list();
    }

    fn log(&self, what: &str, arg: impl std::fmt::Display) {
        if trace::enabled() {
            eprintln!("[debugger] {:?} {what} {arg}", self.kind);
        }
    }
}

fn entries_of(guards: &[Guard]) -> Vec<GuardEntry> {
    guards
        .iter()
        .enumerate()
        .map(|(slot, g)| GuardEntry {
            slot,
            address: Address::from_masked(g.addr),
            enabled: g.enabled,
            conditional: g.conditional,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use machine_amiga::{Amiga, AmigaModel, MachineConfig};

    fn registry(style: RegistryStyle) -> Registry<Amiga> {
        let config = MachineConfig::preset(AmigaModel::A500, vec![0; 256 * 1024]);
        let engine = EngineHandle::new(Amiga::new(&config).expect("valid config"));
        Registry::new(engine, GuardKind::Breakpoint, style)
    }

    fn addr(v: u32) -> Address {
        Address::new(v).expect("valid")
    }

    #[test]
    fn editable_view_ends_with_add_row() {
        let mut r = registry(RegistryStyle::Editable);
        r.add(addr(0x1000)).expect("added");
        let rows = r.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.last(), Some(&RegistryRow::AddNew));

        let mut ro = registry(RegistryStyle::ReadOnly);
        ro.add(addr(0x1000)).expect("added");
        assert!(matches!(ro.rows().as_slice(), [RegistryRow::Entry(_)]));
    }

    #[test]
    fn toggle_at_cycles_through_states() {
        let mut r = registry(RegistryStyle::ReadOnly);
        let a = addr(0x2000);
        r.toggle_at(a);
        assert_eq!(r.entry_at(a).map(|e| e.enabled), Some(true));
        r.toggle_at(a);
        assert_eq!(r.entry_at(a).map(|e| e.enabled), Some(false));
        r.toggle_at(a);
        assert_eq!(r.entry_at(a).map(|e| e.enabled), Some(true));
        assert_eq!(r.entries().len(), 1);
    }

    #[test]
    fn toggle_at_targets_the_matching_slot() {
        let mut r = registry(RegistryStyle::ReadOnly);
        r.add(addr(0x1000)).expect("added");
        r.add(addr(0x2000)).expect("added");
        r.toggle_at(addr(0x2000));
        let enabled: Vec<_> = r.entries().iter().map(|e| (e.address.get(), e.enabled)).collect();
        assert_eq!(enabled, vec![(0x1000, true), (0x2000, false)]);
    }

    #[test]
    fn add_or_remove_at_flips_presence() {
        let mut r = registry(RegistryStyle::ReadOnly);
        let a = addr(0x3000);
        r.add_or_remove_at(a);
        assert!(r.has_entry_at(a));
        r.add_or_remove_at(a);
        assert!(!r.has_entry_at(a));
        assert!(r.entries().is_empty());
    }

    #[test]
    fn out_of_range_slot_is_reported() {
        let mut r = registry(RegistryStyle::ReadOnly);
        r.add(addr(0x1000)).expect("added");
        assert_eq!(
            r.remove(3),
            Err(DebuggerError::SlotOutOfRange { slot: 3, count: 1 })
        );
        assert_eq!(
            r.toggle_enabled(1),
            Err(DebuggerError::SlotOutOfRange { slot: 1, count: 1 })
        );
        assert_eq!(r.list().len(), 1);
    }

    #[test]
    fn failed_edit_releases_the_lock() {
        let mut r = registry(RegistryStyle::ReadOnly);
        r.add(addr(0x1000)).expect("added");
        assert!(r.add(addr(0x1000)).is_err());
        // Would deadlock if the failing path kept the guard.
        assert_eq!(r.engine.lock().guard_count(GuardKind::Breakpoint), 1);
    }
}
