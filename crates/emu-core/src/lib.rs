//! Core traits and types for inspecting a running emulator.
//!
//! The emulation engine owns all live state. Debugger layers see it only
//! through [`DebugTarget`] and never keep a reference across calls.

mod debug;
mod observable;

pub use debug::{
    ADDRESS_MASK, BANK_COUNT, BusOwner, DebugTarget, DmaDebuggerInfo, DmaDisplayMode, Guard,
    GuardKind, InstrInfo, MIN_INSTR_BYTES, MemoryRegion, MemoryRegionKind, Rgb,
};
pub use observable::{Observable, Value};
