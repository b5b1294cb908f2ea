//! Scripted debug target for integration tests.
//!
//! Instruction lengths come from a repeating pattern indexed by word
//! address, with per-address overrides. Memory regions are a fixed table.

#![allow(dead_code)]

use std::collections::HashMap;

use emu_core::{
    BANK_COUNT, BusOwner, DebugTarget, DmaDebuggerInfo, DmaDisplayMode, Guard, GuardKind,
    InstrInfo, MemoryRegion, MemoryRegionKind, Rgb,
};
use machine_amiga::dma_debug::DmaDebugger;

pub struct MockTarget {
    pub pattern: Vec<u32>,
    pub lengths: HashMap<u32, u32>,
    pub regions: [MemoryRegion; BANK_COUNT],
    pub pc: u32,
    pub breakpoints: Vec<Guard>,
    pub watchpoints: Vec<Guard>,
    pub dma: DmaDebugger,
    /// Number of `disassemble` calls, to spot rebuilds.
    pub decodes: std::cell::Cell<usize>,
}

impl MockTarget {
    /// Every instruction two bytes long, chip RAM in bank 0 only.
    pub fn new() -> Self {
        let mut regions = [MemoryRegion::UNMAPPED; BANK_COUNT];
        regions[0] = MemoryRegion::primary(MemoryRegionKind::Chip);
        Self {
            pattern: vec![2],
            lengths: HashMap::new(),
            regions,
            pc: 0,
            breakpoints: Vec::new(),
            watchpoints: Vec::new(),
            dma: DmaDebugger::default(),
            decodes: std::cell::Cell::new(0),
        }
    }

    pub fn with_pattern(pattern: Vec<u32>) -> Self {
        Self {
            pattern,
            ..Self::new()
        }
    }

    /// `count` instructions from `start`, alternating 2 and 4 bytes.
    pub fn alternating(start: u32, count: usize) -> Self {
        let mut target = Self::new();
        let mut addr = start;
        for i in 0..count {
            let len = if i % 2 == 0 { 2 } else { 4 };
            target.lengths.insert(addr, len);
            addr += len;
        }
        target
    }

    fn length_at(&self, addr: u32) -> u32 {
        self.lengths.get(&addr).copied().unwrap_or_else(|| {
            self.pattern[(addr as usize / 2) % self.pattern.len()]
        })
    }

    fn list(&self, kind: GuardKind) -> &Vec<Guard> {
        match kind {
            GuardKind::Breakpoint => &self.breakpoints,
            GuardKind::Watchpoint => &self.watchpoints,
        }
    }

    fn list_mut(&mut self, kind: GuardKind) -> &mut Vec<Guard> {
        match kind {
            GuardKind::Breakpoint => &mut self.breakpoints,
            GuardKind::Watchpoint => &mut self.watchpoints,
        }
    }
}

impl DebugTarget for MockTarget {
    fn disassemble(&self, addr: u32) -> InstrInfo {
        self.decodes.set(self.decodes.get() + 1);
        let bytes = self.length_at(addr);
        InstrInfo {
            instr: format!("op{bytes}"),
            data: format!("{addr:06X}"),
            bytes,
        }
    }

    fn memory_region(&self, bank_addr: u32) -> MemoryRegion {
        self.regions[(bank_addr >> 16) as usize & 0xFF]
    }

    fn peek(&self, addr: u32) -> u8 {
        addr as u8
    }

    fn program_counter(&self) -> u32 {
        self.pc
    }

    fn guards(&self, kind: GuardKind) -> Vec<Guard> {
        self.list(kind).clone()
    }

    fn add_guard(&mut self, kind: GuardKind, addr: u32) {
        self.list_mut(kind).push(Guard {
            addr,
            enabled: true,
            conditional: false,
        });
    }

    fn remove_guard(&mut self, kind: GuardKind, slot: usize) {
        let list = self.list_mut(kind);
        if slot < list.len() {
            list.remove(slot);
        }
    }

    fn set_guard_enabled(&mut self, kind: GuardKind, slot: usize, enabled: bool) {
        if let Some(g) = self.list_mut(kind).get_mut(slot) {
            g.enabled = enabled;
        }
    }

    fn dma_debugger(&self) -> DmaDebuggerInfo {
        self.dma.info()
    }

    fn dma_debug_set_enabled(&mut self, enabled: bool) {
        self.dma.set_enabled(enabled);
    }

    fn dma_debug_set_visualize(&mut self, owner: BusOwner, visualize: bool) {
        self.dma.set_visualize(owner, visualize);
    }

    fn dma_debug_set_color(&mut self, owner: BusOwner, color: Rgb) {
        self.dma.set_color(owner, color);
    }

    fn dma_debug_set_opacity(&mut self, opacity: f64) {
        self.dma.set_opacity(opacity);
    }

    fn dma_debug_set_display_mode(&mut self, mode: DmaDisplayMode) {
        self.dma.set_display_mode(mode);
    }
}
