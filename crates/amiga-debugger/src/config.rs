//! Debugger configuration.

/// Smallest disassembly window.
pub const MIN_WINDOW_ROWS: usize = 1;

/// Widest memory-panel line.
pub const MAX_LINE_BYTES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebuggerConfig {
    /// Slots in the disassembly window.
    pub window_rows: usize,
    /// Bytes per memory-panel line. Rounded up to a power of two in
    /// `1..=MAX_LINE_BYTES` when used, so lines never straddle a bank.
    pub memory_line_bytes: usize,
    /// Start out following the program counter.
    pub follow_pc: bool,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            window_rows: 256,
            memory_line_bytes: 16,
            follow_pc: true,
        }
    }
}

impl DebuggerConfig {
    /// Window size, raised to at least one row.
    #[must_use]
    pub fn with_window_rows(mut self, rows: usize) -> Self {
        self.window_rows = rows.max(MIN_WINDOW_ROWS);
        self
    }

    #[must_use]
    pub fn with_memory_line_bytes(mut self, bytes: usize) -> Self {
        self.memory_line_bytes = line_width(bytes);
        self
    }
}

pub(crate) fn line_width(bytes: usize) -> usize {
    bytes.clamp(1, MAX_LINE_BYTES).next_power_of_two()
}
