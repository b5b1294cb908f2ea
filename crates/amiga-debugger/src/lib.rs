//! Live debugger data layer for the Amiga.
//!
//! Sits between a running emulation engine and the debugger panels. The
//! engine owns all state; this crate keeps rebuildable caches over it:
//!
//! - [`disasm`]: a fixed-size disassembly window with address/row indices
//! - [`registry`]: breakpoint and watchpoint list views
//! - [`memory_map`]: per-bank region classification and layout colours
//! - [`bus_activity`]: DMA debugger (bus owner overlay) controls
//! - [`navigator`]: jump-to address, PC, bank and region
//!
//! [`Debugger`] ties them together behind one [`Command`] interface and
//! produces render-ready [`Snapshot`]s.

pub mod address;
pub mod bus_activity;
pub mod command;
pub mod config;
pub mod debugger;
pub mod disasm;
pub mod engine;
pub mod error;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod memory_map;
pub mod navigator;
pub mod registry;
mod trace;

pub use address::Address;
pub use bus_activity::{BusActivity, BusDebugView, BusOwnerVisual, OwnerGroup};
pub use command::{Command, NavTarget, VisualField};
pub use config::DebuggerConfig;
pub use debugger::{Debugger, Snapshot};
pub use disasm::{BreakpointMarker, DisassemblyRow, DisassemblyWindow};
pub use engine::EngineHandle;
pub use error::DebuggerError;
pub use memory_map::{BankColor, Classifier, region_color};
pub use navigator::{Anchor, MemoryLine, MemoryView, Navigator};
pub use registry::{GuardEntry, Registry, RegistryRow, RegistryStyle};
