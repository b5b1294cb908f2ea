//! Address-space classification.
//!
//! One region per 64K bank, re-read from the engine on every call. A
//! reconfigured engine (RAM added, overlay switched off) shows up on the
//! next query without any invalidation step.

use emu_core::{BANK_COUNT, DebugTarget, MemoryRegion, MemoryRegionKind, Rgb};

use crate::address::Address;
use crate::engine::EngineHandle;
use crate::error::DebuggerError;

/// Layout colour for a region kind.
#[must_use]
pub const fn region_color(kind: MemoryRegionKind) -> Rgb {
    match kind {
        MemoryRegionKind::Chip => Rgb::new(0x80, 0xFF, 0x00),
        MemoryRegionKind::Slow => Rgb::new(0x66, 0xCC, 0x00),
        MemoryRegionKind::Fast => Rgb::new(0x4C, 0x99, 0x00),
        MemoryRegionKind::Rom => Rgb::new(0xFF, 0x00, 0x00),
        MemoryRegionKind::Wom => Rgb::new(0xCC, 0x00, 0x00),
        MemoryRegionKind::Ext => Rgb::new(0x99, 0x00, 0x00),
        MemoryRegionKind::Cia => Rgb::new(0x66, 0xB2, 0xFF),
        MemoryRegionKind::Rtc => Rgb::new(0xB2, 0x66, 0xFF),
        MemoryRegionKind::Custom => Rgb::new(0xFF, 0xFF, 0x66),
        MemoryRegionKind::AutoConfig => Rgb::new(0xFF, 0x66, 0xB2),
        MemoryRegionKind::Unmapped => Rgb::new(0x80, 0x80, 0x80),
    }
}

/// One cell of the memory layout strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct BankColor {
    pub kind: MemoryRegionKind,
    pub color: Rgb,
    /// Drawn hatched.
    pub mirrored: bool,
}

impl From<MemoryRegion> for BankColor {
    fn from(region: MemoryRegion) -> Self {
        Self {
            kind: region.kind,
            color: region_color(region.kind),
            mirrored: region.mirrored,
        }
    }
}

/// Classify every bank of `target`. The caller holds the lock.
pub(crate) fn strip_of<T: DebugTarget + ?Sized>(target: &T) -> [MemoryRegion; BANK_COUNT] {
    std::array::from_fn(|bank| target.memory_region((bank as u32) << 16))
}

pub struct Classifier<T> {
    engine: EngineHandle<T>,
}

impl<T: DebugTarget> Classifier<T> {
    pub fn new(engine: EngineHandle<T>) -> Self {
        Self { engine }
    }

    /// Region of the bank containing `addr`.
    pub fn classify(&self, addr: Address) -> MemoryRegion {
        self.engine.with(|t| t.memory_region(addr.bank_base()))
    }

    pub fn classify_raw(&self, addr: u32) -> Result<MemoryRegion, DebuggerError> {
        Ok(self.classify(Address::new(addr)?))
    }

    /// All 256 banks under a single lock acquisition.
    pub fn bank_strip(&self) -> [MemoryRegion; BANK_COUNT] {
        self.engine.with(|t| strip_of(t))
    }

    pub fn bank_colors(&self) -> Vec<BankColor> {
        self.bank_strip().into_iter().map(BankColor::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machine_amiga::{Amiga, AmigaModel, MachineConfig};

    fn classifier() -> Classifier<Amiga> {
        let config = MachineConfig::preset(AmigaModel::A500, vec![0; 256 * 1024]);
        Classifier::new(EngineHandle::new(Amiga::new(&config).expect("valid config")))
    }

    #[test]
    fn classify_uses_bank_aligned_address() {
        let c = classifier();
        let region = c.classify(Address::new(0x00DF_F180).expect("valid"));
        assert_eq!(region, MemoryRegion::primary(MemoryRegionKind::Custom));
    }

    #[test]
    fn classify_raw_rejects_out_of_range() {
        assert_eq!(
            classifier().classify_raw(0x0100_0000),
            Err(DebuggerError::InvalidAddress(0x0100_0000))
        );
    }

    #[test]
    fn strip_tracks_engine_reconfiguration() {
        let c = classifier();
        assert_eq!(c.bank_strip()[0].kind, MemoryRegionKind::Chip);
        c.engine.with_mut(|a| a.memory.overlay = true);
        assert_eq!(c.bank_strip()[0], MemoryRegion::mirror(MemoryRegionKind::Rom));
    }

    #[test]
    fn colors_follow_region_kind() {
        let colors = classifier().bank_colors();
        assert_eq!(colors.len(), BANK_COUNT);
        assert_eq!(colors[0].color.to_u32(), 0x0080_FF00);
        assert_eq!(colors[0xF8].color, region_color(MemoryRegionKind::Rom));
        assert_eq!(colors[0x30].color.to_u32(), 0x0080_8080);
    }
}
