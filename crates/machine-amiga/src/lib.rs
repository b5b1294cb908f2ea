//! Headless Amiga debug target.
//!
//! Holds the parts of a machine a debugger inspects: the 24-bit memory map,
//! the program counter, breakpoint and watchpoint lists, and the DMA
//! debugger settings. It does not execute code. `advance_pc` walks the
//! instruction stream so front ends can be exercised against a moving PC.

pub mod config;
pub mod disasm;
pub mod dma_debug;
pub mod guards;
pub mod memory;

use emu_core::{
    ADDRESS_MASK, BusOwner, DebugTarget, DmaDebuggerInfo, DmaDisplayMode, Guard, GuardKind,
    InstrInfo, MemoryRegion, Observable, Rgb, Value,
};
use thiserror::Error;

pub use crate::config::{AmigaModel, KickstartSource, MachineConfig};
use crate::dma_debug::DmaDebugger;
use crate::guards::GuardList;
use crate::memory::{BANK_SIZE, Memory};

/// Machine construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("invalid Kickstart size: {0} bytes (expected 262144 or 524288)")]
    KickstartSize(usize),
    #[error("invalid {name} RAM size: {size} bytes")]
    RamSize { name: &'static str, size: usize },
    #[error("invalid extended ROM size: {0} bytes")]
    ExtRomSize(usize),
}

/// Outcome of moving the program counter by one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// PC moved to the given address.
    Moved(u32),
    /// PC moved onto an enabled breakpoint.
    Breakpoint(u32),
}

pub struct Amiga {
    pub model: AmigaModel,
    pub memory: Memory,
    pc: u32,
    breakpoints: GuardList,
    watchpoints: GuardList,
    pub dma_debugger: DmaDebugger,
}

impl Amiga {
    /// Construct a machine instance from a config object.
    pub fn new(config: &MachineConfig) -> Result<Self, MachineError> {
        Ok(Self {
            model: config.model,
            memory: Memory::new(config)?,
            pc: 0x00F8_0002,
            breakpoints: GuardList::default(),
            watchpoints: GuardList::default(),
            dma_debugger: DmaDebugger::default(),
        })
    }

    /// Swap in a new memory configuration. Guards and DMA debugger
    /// settings survive; anything derived from the old map does not.
    pub fn reconfigure(&mut self, config: &MachineConfig) -> Result<(), MachineError> {
        self.memory = Memory::new(config)?;
        self.model = config.model;
        Ok(())
    }

    /// Map Kickstart at $0 and load the PC from the reset vector.
    pub fn reset(&mut self) {
        self.memory.overlay = true;
        let hi = u32::from(self.memory.peek_word(4));
        let lo = u32::from(self.memory.peek_word(6));
        self.pc = (hi << 16 | lo) & ADDRESS_MASK;
    }

    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc & ADDRESS_MASK;
    }

    /// Move the PC past the current instruction without executing it.
    pub fn advance_pc(&mut self) -> Step {
        let len = self.disassemble(self.pc).bytes;
        self.pc = self.pc.wrapping_add(len) & ADDRESS_MASK;
        if self.breakpoints.hit(self.pc) {
            Step::Breakpoint(self.pc)
        } else {
            Step::Moved(self.pc)
        }
    }

    #[must_use]
    pub fn guard_list(&self, kind: GuardKind) -> &GuardList {
        match kind {
            GuardKind::Breakpoint => &self.breakpoints,
            GuardKind::Watchpoint => &self.watchpoints,
        }
    }

    pub fn guard_list_mut(&mut self, kind: GuardKind) -> &mut GuardList {
        match kind {
            GuardKind::Breakpoint => &mut self.breakpoints,
            GuardKind::Watchpoint => &mut self.watchpoints,
        }
    }
}

impl DebugTarget for Amiga {
    fn disassemble(&self, addr: u32) -> InstrInfo {
        disasm::disassemble(addr & ADDRESS_MASK, |a| self.memory.peek_word(a))
    }

    fn memory_region(&self, bank_addr: u32) -> MemoryRegion {
        self.memory.region(((bank_addr & ADDRESS_MASK) as usize) / BANK_SIZE)
    }

    fn peek(&self, addr: u32) -> u8 {
        self.memory.peek(addr)
    }

    fn program_counter(&self) -> u32 {
        self.pc
    }

    fn guards(&self, kind: GuardKind) -> Vec<Guard> {
        self.guard_list(kind).snapshot()
    }

    fn add_guard(&mut self, kind: GuardKind, addr: u32) {
        self.guard_list_mut(kind).add(addr & ADDRESS_MASK);
    }

    fn remove_guard(&mut self, kind: GuardKind, slot: usize) {
        self.guard_list_mut(kind).remove(slot);
    }

    fn set_guard_enabled(&mut self, kind: GuardKind, slot: usize, enabled: bool) {
        self.guard_list_mut(kind).set_enabled(slot, enabled);
    }

    fn dma_debugger(&self) -> DmaDebuggerInfo {
        self.dma_debugger.info()
    }

    fn dma_debug_set_enabled(&mut self, enabled: bool) {
        self.dma_debugger.set_enabled(enabled);
    }

    fn dma_debug_set_visualize(&mut self, owner: BusOwner, visualize: bool) {
        self.dma_debugger.set_visualize(owner, visualize);
    }

    fn dma_debug_set_color(&mut self, owner: BusOwner, color: Rgb) {
        self.dma_debugger.set_color(owner, color);
    }

    fn dma_debug_set_opacity(&mut self, opacity: f64) {
        self.dma_debugger.set_opacity(opacity);
    }

    fn dma_debug_set_display_mode(&mut self, mode: DmaDisplayMode) {
        self.dma_debugger.set_display_mode(mode);
    }

    fn guard_count(&self, kind: GuardKind) -> usize {
        self.guard_list(kind).len()
    }
}

impl Observable for Amiga {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.pc.into()),
            "memory.overlay" => Some(self.memory.overlay.into()),
            "memory.chip_ram" => Some(self.memory.chip_ram.len().into()),
            "memory.slow_ram" => Some(self.memory.slow_ram.len().into()),
            "memory.fast_ram" => Some(self.memory.fast_ram.len().into()),
            "breakpoints.count" => Some(self.breakpoints.len().into()),
            "watchpoints.count" => Some(self.watchpoints.len().into()),
            "dma.enabled" => Some(self.dma_debugger.info().enabled.into()),
            "dma.opacity" => Some(self.dma_debugger.info().opacity.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "memory.overlay",
            "memory.chip_ram",
            "memory.slow_ram",
            "memory.fast_ram",
            "breakpoints.count",
            "watchpoints.count",
            "dma.enabled",
            "dma.opacity",
        ]
    }
}
