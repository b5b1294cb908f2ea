//! Validated 24-bit bus addresses.

use std::fmt;

use emu_core::{ADDRESS_MASK, BANK_COUNT};

use crate::error::DebuggerError;

/// An address on the 68000's 24-bit bus.
///
/// Construction rejects anything above `$FFFFFF`; nothing is masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize), serde(transparent))]
pub struct Address(u32);

impl Address {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(ADDRESS_MASK);

    pub fn new(value: u32) -> Result<Self, DebuggerError> {
        if value > ADDRESS_MASK {
            return Err(DebuggerError::InvalidAddress(value));
        }
        Ok(Self(value))
    }

    /// Drops bits above the 24-bit bus.
    #[must_use]
    pub const fn from_masked(value: u32) -> Self {
        Self(value & ADDRESS_MASK)
    }

    /// First address of `bank`.
    pub fn from_bank(bank: usize) -> Result<Self, DebuggerError> {
        if bank >= BANK_COUNT {
            return Err(DebuggerError::InvalidBank(bank));
        }
        Ok(Self((bank as u32) << 16))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn bank(self) -> usize {
        (self.0 >> 16) as usize
    }

    #[must_use]
    pub const fn bank_base(self) -> u32 {
        self.0 & 0x00FF_0000
    }

    #[must_use]
    pub const fn offset_in_bank(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// `None` once the sum leaves the address space.
    #[must_use]
    pub fn checked_add(self, len: u32) -> Option<Self> {
        self.0
            .checked_add(len)
            .filter(|&v| v <= ADDRESS_MASK)
            .map(Self)
    }
}

impl TryFrom<u32> for Address {
    type Error = DebuggerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:06X}", self.0)
    }
}
