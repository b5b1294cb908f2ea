//! The debugger facade.
//!
//! Owns every view over one engine handle and routes [`Command`]s to them.
//! Nothing is read from the engine until the first command; send
//! [`Command::Refresh`] to populate the views.

use std::ops::Range;

use emu_core::{DebugTarget, GuardKind, MemoryRegionKind, Observable, Rgb, Value};

use crate::address::Address;
use crate::bus_activity::{BusActivity, BusDebugView, OwnerGroup};
use crate::command::{Command, NavTarget, VisualField};
use crate::config::DebuggerConfig;
use crate::disasm::{DisassemblyRow, DisassemblyWindow};
use crate::engine::EngineHandle;
use crate::error::DebuggerError;
use crate::memory_map::{BankColor, Classifier, strip_of};
use crate::navigator::{Anchor, MemoryLine, MemoryView, Navigator};
use crate::registry::{Registry, RegistryRow, RegistryStyle};

/// Everything a front end needs to draw the debugger panels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct Snapshot {
    /// Exactly `window_rows` slots.
    pub rows: Vec<Option<DisassemblyRow>>,
    pub selected_row: Option<usize>,
    pub anchor: Anchor,
    /// One entry per bank.
    pub bank_strip: Vec<BankColor>,
    pub bus: BusDebugView,
    pub bus_palette: Vec<(OwnerGroup, Rgb)>,
    pub breakpoints: Vec<RegistryRow>,
    pub watchpoints: Vec<RegistryRow>,
    pub memory_view: MemoryView,
}

pub struct Debugger<T> {
    engine: EngineHandle<T>,
    config: DebuggerConfig,
    classifier: Classifier<T>,
    navigator: Navigator<T>,
    breakpoints: Registry<T>,
    watchpoints: Registry<T>,
    bus: BusActivity<T>,
}

impl<T: DebugTarget> Debugger<T> {
    pub fn new(engine: EngineHandle<T>, config: DebuggerConfig) -> Self {
        let anchor = if config.follow_pc {
            Anchor::FollowingPc
        } else {
            Anchor::Fixed(Address::ZERO)
        };
        Self {
            classifier: Classifier::new(engine.clone()),
            navigator: Navigator::new(
                engine.clone(),
                config.window_rows,
                config.memory_line_bytes,
            )
            .with_anchor(anchor),
            breakpoints: Registry::new(
                engine.clone(),
                GuardKind::Breakpoint,
                RegistryStyle::Editable,
            ),
            watchpoints: Registry::new(
                engine.clone(),
                GuardKind::Watchpoint,
                RegistryStyle::Editable,
            ),
            bus: BusActivity::new(engine.clone()),
            engine,
            config,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &EngineHandle<T> {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    pub fn apply(&mut self, command: Command) -> Result<(), DebuggerError> {
        match command {
            Command::SetBreakpoint { kind, address } => {
                let address = Address::new(address)?;
                self.registry_mut(kind).add(address)?;
                self.guards_changed();
            }
            Command::RemoveBreakpoint { kind, slot } => {
                self.registry_mut(kind).remove(slot)?;
                self.guards_changed();
            }
            Command::ToggleEnabled { kind, slot } => {
                self.registry_mut(kind).toggle_enabled(slot)?;
                self.guards_changed();
            }
            Command::ToggleBreakpointAtRow(row) => {
                let address = self.row_address(row)?;
                self.breakpoints.toggle_at(address);
                self.guards_changed();
            }
            Command::AddOrRemoveBreakpointAtRow(row) => {
                let address = self.row_address(row)?;
                self.breakpoints.add_or_remove_at(address);
                self.guards_changed();
            }
            Command::Navigate(target) => {
                self.navigate(target)?;
            }
            Command::SetBusEnabled(enabled) => self.bus.set_enabled(enabled),
            Command::SetBusOwnerVisual { group, field } => match field {
                VisualField::Visualize(on) => self.bus.set_visualize(group, on),
                VisualField::Color(color) => self.bus.set_color(group, color),
            },
            Command::SetBusOpacity(opacity) => self.bus.set_opacity(opacity),
            Command::SetBusDisplayMode(mode) => self.bus.set_display_mode(mode),
            Command::Refresh => {
                self.navigator.refresh()?;
                self.breakpoints.list();
                self.watchpoints.list();
            }
        }
        Ok(())
    }

    /// Like `Navigate(Region(kind))`, but reports the bank it landed on.
    pub fn jump_to_region(
        &mut self,
        kind: MemoryRegionKind,
    ) -> Result<Option<usize>, DebuggerError> {
        self.navigator.jump_to_region(kind)
    }

    /// Guard lists and markers are re-read here, so edits made on the
    /// engine side since the last command still show up.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (strip, dma, breakpoints, watchpoints) = self.engine.with(|t| {
            (
                strip_of(t),
                t.dma_debugger(),
                t.guards(GuardKind::Breakpoint),
                t.guards(GuardKind::Watchpoint),
            )
        });
        let bus = BusDebugView::from(&dma);
        Snapshot {
            rows: self.navigator.window().slots_marked(&breakpoints),
            selected_row: self.navigator.selected_row(),
            anchor: self.navigator.anchor(),
            bank_strip: strip.into_iter().map(BankColor::from).collect(),
            bus_palette: bus.palette(),
            bus,
            breakpoints: self.breakpoints.rows_from(&breakpoints),
            watchpoints: self.watchpoints.rows_from(&watchpoints),
            memory_view: self.navigator.memory_view(),
        }
    }

    pub fn memory_lines(&self, lines: Range<usize>) -> Vec<MemoryLine> {
        self.navigator.memory_lines(lines)
    }

    #[must_use]
    pub fn window(&self) -> &DisassemblyWindow<T> {
        self.navigator.window()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator<T> {
        &self.navigator
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier<T> {
        &self.classifier
    }

    #[must_use]
    pub fn registry(&self, kind: GuardKind) -> &Registry<T> {
        match kind {
            GuardKind::Breakpoint => &self.breakpoints,
            GuardKind::Watchpoint => &self.watchpoints,
        }
    }

    pub fn registry_mut(&mut self, kind: GuardKind) -> &mut Registry<T> {
        match kind {
            GuardKind::Breakpoint => &mut self.breakpoints,
            GuardKind::Watchpoint => &mut self.watchpoints,
        }
    }

    #[must_use]
    pub fn bus(&self) -> &BusActivity<T> {
        &self.bus
    }

    fn navigate(&mut self, target: NavTarget) -> Result<(), DebuggerError> {
        match target {
            NavTarget::Address(addr) => self.navigator.jump_to_address(addr),
            NavTarget::ProgramCounter => self.navigator.jump_to_pc(),
            NavTarget::Bank(bank) => self.navigator.jump_to_bank(bank),
            NavTarget::Region(kind) => self.navigator.jump_to_region(kind).map(|_| ()),
            NavTarget::MemoryAddress(addr) => self.navigator.jump_to_memory_address(addr),
        }
    }

    fn row_address(&self, row: usize) -> Result<Address, DebuggerError> {
        self.navigator
            .window()
            .address_at(row)
            .ok_or(DebuggerError::EmptyRow(row))
    }

    fn guards_changed(&mut self) {
        self.breakpoints.list();
        self.watchpoints.list();
        self.navigator.refresh_markers();
    }
}

impl<T: DebugTarget> Observable for Debugger<T> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "anchor" => Some(match self.navigator.anchor() {
                Anchor::FollowingPc => Value::from("pc"),
                Anchor::Fixed(addr) => Value::U32(addr.get()),
            }),
            "window.origin" => Some(
                self.navigator
                    .window()
                    .origin()
                    .map_or(Value::from("none"), |a| Value::U32(a.get())),
            ),
            "window.rows" => Some(self.navigator.window().len().into()),
            "selected_row" => Some(
                self.navigator
                    .selected_row()
                    .map_or(Value::from("none"), Value::from),
            ),
            "breakpoints.count" => Some(self.breakpoints.entries().len().into()),
            "watchpoints.count" => Some(self.watchpoints.entries().len().into()),
            "memory.bank" => Some(Value::U8(self.navigator.memory_view().bank as u8)),
            "bus.enabled" => Some(self.engine.with(|t| t.dma_debugger().enabled).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "anchor",
            "window.origin",
            "window.rows",
            "selected_row",
            "breakpoints.count",
            "watchpoints.count",
            "memory.bank",
            "bus.enabled",
        ]
    }
}
