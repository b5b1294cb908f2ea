//! Commands from the presentation layer.
//!
//! Every button, slider and click in the debugger panels becomes one of
//! these and goes through [`Debugger::apply`](crate::Debugger::apply).

use emu_core::{DmaDisplayMode, GuardKind, MemoryRegionKind, Rgb};

use crate::bus_activity::OwnerGroup;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetBreakpoint { kind: GuardKind, address: u32 },
    RemoveBreakpoint { kind: GuardKind, slot: usize },
    ToggleEnabled { kind: GuardKind, slot: usize },
    /// Click in the breakpoint column of the instruction list.
    ToggleBreakpointAtRow(usize),
    /// Double click on an instruction row.
    AddOrRemoveBreakpointAtRow(usize),
    Navigate(NavTarget),
    SetBusEnabled(bool),
    SetBusOwnerVisual { group: OwnerGroup, field: VisualField },
    SetBusOpacity(f64),
    SetBusDisplayMode(DmaDisplayMode),
    /// The engine changed underneath us (stepped, paused, reconfigured).
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Address(u32),
    ProgramCounter,
    Bank(usize),
    Region(MemoryRegionKind),
    /// Memory panel search.
    MemoryAddress(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualField {
    Visualize(bool),
    Color(Rgb),
}
