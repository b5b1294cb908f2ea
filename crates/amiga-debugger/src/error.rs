//! Debugger errors.
//!
//! Every variant is recoverable: the debugger stays usable after any of
//! them and no cache is touched on the failing path.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebuggerError {
    #[error("address ${0:X} is outside the 24-bit address space")]
    InvalidAddress(u32),
    #[error("bank {0} is out of range (0-255)")]
    InvalidBank(usize),
    #[error("a guard already exists at ${0:06X}")]
    DuplicateBreakpoint(u32),
    #[error("slot {slot} is out of range ({count} entries)")]
    SlotOutOfRange { slot: usize, count: usize },
    #[error("row {0} holds no instruction")]
    EmptyRow(usize),
    #[error("unknown display mode tag {0}")]
    InvalidDisplayMode(i64),
    #[error("unknown bus owner tag {0}")]
    InvalidOwnerTag(i64),
}
