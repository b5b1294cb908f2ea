//! Navigation across the instruction list and the memory panel.
//!
//! The instruction list either follows the program counter or stays at a
//! fixed origin. Jumps to an address already in the window just move the
//! selection; anything else rebuilds. Input is validated before any cache
//! is touched, so a rejected jump leaves window and selection as they were.

use std::ops::Range;

use emu_core::{DebugTarget, MemoryRegion, MemoryRegionKind};

use crate::address::Address;
use crate::config::line_width;
use crate::disasm::DisassemblyWindow;
use crate::engine::EngineHandle;
use crate::error::DebuggerError;
use crate::memory_map::strip_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub enum Anchor {
    FollowingPc,
    Fixed(Address),
}

/// What the memory panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct MemoryView {
    pub bank: usize,
    pub region: MemoryRegion,
    /// First visible line within the bank.
    pub line: usize,
    /// Address found by the last search.
    pub highlight: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct MemoryLine {
    pub address: Address,
    pub bytes: Vec<u8>,
}

pub struct Navigator<T> {
    engine: EngineHandle<T>,
    window: DisassemblyWindow<T>,
    anchor: Anchor,
    selected: Option<usize>,
    memory: MemoryView,
    line_bytes: usize,
}

impl<T: DebugTarget> Navigator<T> {
    pub fn new(engine: EngineHandle<T>, window_rows: usize, line_bytes: usize) -> Self {
        Self {
            window: DisassemblyWindow::new(engine.clone(), window_rows),
            engine,
            anchor: Anchor::FollowingPc,
            selected: None,
            memory: MemoryView {
                bank: 0,
                region: MemoryRegion::UNMAPPED,
                line: 0,
                highlight: None,
            },
            line_bytes: line_width(line_bytes),
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn window(&self) -> &DisassemblyWindow<T> {
        &self.window
    }

    #[must_use]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    #[must_use]
    pub fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn memory_view(&self) -> MemoryView {
        self.memory
    }

    pub fn jump_to_address(&mut self, addr: u32) -> Result<(), DebuggerError> {
        let addr = Address::new(addr)?;
        self.show(addr);
        self.anchor = Anchor::Fixed(addr);
        Ok(())
    }

    pub fn jump_to_pc(&mut self) -> Result<(), DebuggerError> {
        let pc = Address::new(self.engine.with(DebugTarget::program_counter))?;
        self.show(pc);
        self.anchor = Anchor::FollowingPc;
        Ok(())
    }

    /// Pick up engine changes. A following window rebuilds at its current
    /// origin while the PC is still inside it, otherwise at the PC. A fixed
    /// window rebuilds in place and keeps its selection.
    pub fn refresh(&mut self) -> Result<(), DebuggerError> {
        match self.anchor {
            Anchor::FollowingPc => {
                let pc = Address::new(self.engine.with(DebugTarget::program_counter))?;
                let origin = self.window.origin().filter(|_| self.window.row_for(pc).is_some());
                if let Some(origin) = origin {
                    self.window.rebuild(origin);
                }
                if let Some(row) = self.window.row_for(pc) {
                    self.selected = Some(row);
                } else {
                    self.window.rebuild(pc);
                    self.selected = Some(0);
                }
            }
            Anchor::Fixed(addr) => {
                let origin = self.window.origin().unwrap_or(addr);
                self.window.rebuild(origin);
                self.selected = match self.window.len() {
                    0 => None,
                    len => Some(self.selected.unwrap_or(0).min(len - 1)),
                };
            }
        }
        Ok(())
    }

    pub fn refresh_markers(&mut self) {
        self.window.refresh_markers();
    }

    pub fn jump_to_bank(&mut self, bank: usize) -> Result<(), DebuggerError> {
        let base = Address::from_bank(bank)?;
        let region = self.engine.with(|t| t.memory_region(base.get()));
        self.memory.bank = bank;
        self.memory.region = region;
        self.memory.line = 0;
        Ok(())
    }

    /// Show the first primary bank classified as `kind`, or the first
    /// mirror when the region has no primary bank. Returns the bank, or
    /// `None` when nothing matches.
    pub fn jump_to_region(
        &mut self,
        kind: MemoryRegionKind,
    ) -> Result<Option<usize>, DebuggerError> {
        let strip = self.engine.with(|t| strip_of(t));
        let primary = strip.iter().position(|r| r.kind == kind && !r.mirrored);
        let Some(bank) = primary.or_else(|| strip.iter().position(|r| r.kind == kind)) else {
            return Ok(None);
        };
        self.jump_to_bank(bank)?;
        Ok(Some(bank))
    }

    /// Scroll the memory panel to the line holding `addr` and mark it.
    pub fn jump_to_memory_address(&mut self, addr: u32) -> Result<(), DebuggerError> {
        let addr = Address::new(addr)?;
        self.jump_to_bank(addr.bank())?;
        self.memory.line = addr.offset_in_bank() as usize / self.line_bytes;
        self.memory.highlight = Some(addr);
        Ok(())
    }

    /// Read lines of the displayed bank. The range is clamped to the bank.
    pub fn memory_lines(&self, lines: Range<usize>) -> Vec<MemoryLine> {
        let per_bank = self.lines_per_bank();
        let lines = lines.start.min(per_bank)..lines.end.min(per_bank);
        let base = (self.memory.bank as u32) << 16;
        let width = self.line_bytes;

        self.engine.with(|t| {
            lines
                .map(|line| {
                    let start = base + (line * width) as u32;
                    MemoryLine {
                        address: Address::from_masked(start),
                        bytes: (0..width as u32).map(|i| t.peek(start + i)).collect(),
                    }
                })
                .collect()
        })
    }

    #[must_use]
    pub fn lines_per_bank(&self) -> usize {
        0x1_0000 / self.line_bytes
    }

    /// Move the instruction list so `addr` is visible and selected.
    fn show(&mut self, addr: Address) {
        if let Some(row) = self.window.row_for(addr) {
            self.selected = Some(row);
        } else {
            self.window.rebuild(addr);
            self.selected = Some(0);
        }
    }
}
