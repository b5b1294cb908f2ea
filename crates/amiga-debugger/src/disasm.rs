//! Disassembly window cache.
//!
//! A fixed number of slots filled with consecutive instructions from an
//! origin address. Row `i + 1` always starts where row `i` ends. Slots past
//! the top of the address space stay empty. The window is rebuilt whole;
//! rows are never patched in place.

use std::collections::HashMap;

use emu_core::{ADDRESS_MASK, DebugTarget, Guard, GuardKind, MIN_INSTR_BYTES};

use crate::address::Address;
use crate::engine::EngineHandle;
use crate::trace;

/// How a row's breakpoint column is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub enum BreakpointMarker {
    #[default]
    Default,
    /// Enabled breakpoint.
    Alert,
    /// Enabled breakpoint with a condition attached.
    Warning,
    /// Disabled breakpoint.
    Dimmed,
}

impl BreakpointMarker {
    fn for_guard(guard: Option<&Guard>) -> Self {
        match guard {
            None => Self::Default,
            Some(g) if !g.enabled => Self::Dimmed,
            Some(g) if g.conditional => Self::Warning,
            Some(_) => Self::Alert,
        }
    }

    #[must_use]
    pub const fn glyph(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Alert | Self::Warning => Some("\u{26D4}"),
            Self::Dimmed => Some("\u{26AA}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct DisassemblyRow {
    pub row: usize,
    pub address: Address,
    /// Instruction words as hex.
    pub data: String,
    pub instr: String,
    /// Never less than two.
    pub bytes: u32,
    pub marker: BreakpointMarker,
}

/// Rows plus the address-to-row index. Swapped as one value.
#[derive(Debug, Default)]
struct Layout {
    origin: Option<Address>,
    rows: Vec<DisassemblyRow>,
    by_addr: HashMap<u32, usize>,
}

pub struct DisassemblyWindow<T> {
    engine: EngineHandle<T>,
    capacity: usize,
    layout: Layout,
}

impl<T: DebugTarget> DisassemblyWindow<T> {
    pub fn new(engine: EngineHandle<T>, capacity: usize) -> Self {
        Self {
            engine,
            capacity: capacity.max(1),
            layout: Layout::default(),
        }
    }

    /// Decode up to `capacity` instructions starting at `from`.
    ///
    /// One lock acquisition covers every decode and every marker, so the
    /// window shows a single engine state.
    pub fn rebuild(&mut self, from: Address) -> &Self {
        let layout = {
            let target = self.engine.lock();
            let guards = target.guards(GuardKind::Breakpoint);
            let markers = breakpoint_index(&guards);

            let mut rows = Vec::with_capacity(self.capacity);
            let mut by_addr = HashMap::with_capacity(self.capacity);
            let mut cursor = from.get();
            while rows.len() < self.capacity && cursor <= ADDRESS_MASK {
                let info = target.disassemble(cursor);
                let bytes = info.bytes.max(MIN_INSTR_BYTES);
                let row = rows.len();
                by_addr.insert(cursor, row);
                rows.push(DisassemblyRow {
                    row,
                    address: Address::from_masked(cursor),
                    data: info.data,
                    instr: info.instr,
                    bytes,
                    marker: BreakpointMarker::for_guard(markers.get(&cursor).copied()),
                });
                cursor = cursor.saturating_add(bytes);
            }

            Layout {
                origin: Some(from),
                rows,
                by_addr,
            }
        };

        if trace::enabled() {
            eprintln!(
                "[debugger] rebuilt window at {from}: {}/{} rows",
                layout.rows.len(),
                self.capacity
            );
        }
        self.layout = layout;
        self
    }

    /// Re-derive every marker from the engine without decoding again.
    pub fn refresh_markers(&mut self) {
        let guards = self.engine.with(|t| t.guards(GuardKind::Breakpoint));
        let markers = breakpoint_index(&guards);
        for row in &mut self.layout.rows {
            row.marker = BreakpointMarker::for_guard(markers.get(&row.address.get()).copied());
        }
    }
}

impl<T> DisassemblyWindow<T> {
    /// Row holding an instruction that starts at `addr`.
    #[must_use]
    pub fn row_for(&self, addr: Address) -> Option<usize> {
        self.layout.by_addr.get(&addr.get()).copied()
    }

    #[must_use]
    pub fn address_at(&self, row: usize) -> Option<Address> {
        self.layout.rows.get(row).map(|r| r.address)
    }

    /// `None` for rows past the filled part of the window.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&DisassemblyRow> {
        self.layout.rows.get(row)
    }

    /// Filled rows, in address order.
    #[must_use]
    pub fn rows(&self) -> &[DisassemblyRow] {
        &self.layout.rows
    }

    /// All `capacity` slots, empty ones as `None`.
    pub fn slots(&self) -> impl Iterator<Item = Option<&DisassemblyRow>> {
        (0..self.capacity).map(|i| self.layout.rows.get(i))
    }

    /// Like [`slots`](Self::slots), with markers derived from `guards`
    /// instead of the ones stored at the last rebuild.
    pub(crate) fn slots_marked(&self, guards: &[Guard]) -> Vec<Option<DisassemblyRow>> {
        let markers = breakpoint_index(guards);
        self.slots()
            .map(|slot| {
                slot.map(|row| DisassemblyRow {
                    marker: BreakpointMarker::for_guard(markers.get(&row.address.get()).copied()),
                    ..row.clone()
                })
            })
            .collect()
    }

    #[must_use]
    pub fn origin(&self) -> Option<Address> {
        self.layout.origin
    }

    /// Number of filled rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layout.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layout.rows.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// First guard per address, the one the engine would report.
fn breakpoint_index(guards: &[Guard]) -> HashMap<u32, &Guard> {
    let mut index = HashMap::with_capacity(guards.len());
    for guard in guards {
        index.entry(guard.addr).or_insert(guard);
    }
    index
}
