//! Debug-target contract.
//!
//! Everything a debugger front end may ask of a running machine: single
//! instruction disassembly, the memory map, the breakpoint and watchpoint
//! lists, and the DMA (bus) debugger settings.

/// Mask for the 24-bit address bus.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Number of 64K banks in the 24-bit address space.
pub const BANK_COUNT: usize = 256;

/// Smallest instruction the disassembler may report (one opcode word).
pub const MIN_INSTR_BYTES: u32 = 2;

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrInfo {
    /// Mnemonic and operands, e.g. `move.w #$4000,$dff09a`.
    pub instr: String,
    /// Encoded words as hex text, e.g. `33FC 4000 00DF F09A`.
    pub data: String,
    /// Length in bytes. Never below [`MIN_INSTR_BYTES`].
    pub bytes: u32,
}

/// What backs a 64K bank of the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryRegionKind {
    Unmapped,
    Chip,
    Slow,
    Fast,
    Rom,
    Wom,
    Ext,
    Cia,
    Rtc,
    Custom,
    AutoConfig,
}

impl MemoryRegionKind {
    pub const ALL: [Self; 11] = [
        Self::Unmapped,
        Self::Chip,
        Self::Slow,
        Self::Fast,
        Self::Rom,
        Self::Wom,
        Self::Ext,
        Self::Cia,
        Self::Rtc,
        Self::Custom,
        Self::AutoConfig,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unmapped => "unmapped",
            Self::Chip => "chip",
            Self::Slow => "slow",
            Self::Fast => "fast",
            Self::Rom => "rom",
            Self::Wom => "wom",
            Self::Ext => "ext",
            Self::Cia => "cia",
            Self::Rtc => "rtc",
            Self::Custom => "custom",
            Self::AutoConfig => "autoconfig",
        }
    }

    /// Inverse of [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Classification of one bank: its kind and whether it echoes another bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryRegion {
    pub kind: MemoryRegionKind,
    pub mirrored: bool,
}

impl MemoryRegion {
    pub const UNMAPPED: Self = Self::primary(MemoryRegionKind::Unmapped);

    #[must_use]
    pub const fn primary(kind: MemoryRegionKind) -> Self {
        Self {
            kind,
            mirrored: false,
        }
    }

    #[must_use]
    pub const fn mirror(kind: MemoryRegionKind) -> Self {
        Self {
            kind,
            mirrored: true,
        }
    }
}

/// Which list a guard lives in.
///
/// Breakpoints trigger on instruction fetch, watchpoints on data access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuardKind {
    Breakpoint,
    Watchpoint,
}

/// A breakpoint or watchpoint as the engine stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guard {
    pub addr: u32,
    pub enabled: bool,
    /// Guard only fires when an attached condition holds.
    pub conditional: bool,
}

/// Physical owner of a DMA slot on the chip bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusOwner {
    Cpu,
    Refresh,
    Disk,
    Audio,
    Bpl1,
    Bpl2,
    Bpl3,
    Bpl4,
    Bpl5,
    Bpl6,
    Sprite,
    Copper,
    Blitter,
}

impl BusOwner {
    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Cpu,
        Self::Refresh,
        Self::Disk,
        Self::Audio,
        Self::Bpl1,
        Self::Bpl2,
        Self::Bpl3,
        Self::Bpl4,
        Self::Bpl5,
        Self::Bpl6,
        Self::Sprite,
        Self::Copper,
        Self::Blitter,
    ];

    /// Position in [`DmaDebuggerInfo`] tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// An 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from colour-well channels in 0.0..=1.0. Out-of-range and NaN
    /// channels are clamped.
    #[must_use]
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        fn channel(v: f64) -> u8 {
            if v.is_nan() {
                0
            } else {
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        }
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Packed `0xRRGGBB`.
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// How the DMA debugger overlays bus usage on the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DmaDisplayMode {
    #[default]
    ForegroundLayer,
    BackgroundLayer,
    OddEvenLayers,
}

impl DmaDisplayMode {
    /// Map a UI selector tag to a mode.
    #[must_use]
    pub const fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Self::ForegroundLayer),
            1 => Some(Self::BackgroundLayer),
            2 => Some(Self::OddEvenLayers),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(self) -> i64 {
        self as i64
    }
}

/// Snapshot of the DMA debugger settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DmaDebuggerInfo {
    /// Master switch. Gates the overlay without touching `visualize`.
    pub enabled: bool,
    pub visualize: [bool; BusOwner::COUNT],
    pub color: [Rgb; BusOwner::COUNT],
    /// Overlay opacity, 0.0..=1.0.
    pub opacity: f64,
    pub display_mode: DmaDisplayMode,
}

impl DmaDebuggerInfo {
    #[must_use]
    pub const fn visualize(&self, owner: BusOwner) -> bool {
        self.visualize[owner.index()]
    }

    #[must_use]
    pub const fn color(&self, owner: BusOwner) -> Rgb {
        self.color[owner.index()]
    }
}

/// A machine that can be inspected and steered by a debugger.
///
/// Implementations live behind the engine lock. Callers hold the lock for
/// the duration of a call sequence and drop it before returning to the UI.
pub trait DebugTarget {
    /// Disassemble the instruction at `addr`.
    ///
    /// Never fails: an undecodable opcode comes back as a data word with
    /// [`MIN_INSTR_BYTES`] length.
    fn disassemble(&self, addr: u32) -> InstrInfo;

    /// Classify the bank containing `bank_addr` (expected `addr & 0xFF0000`).
    fn memory_region(&self, bank_addr: u32) -> MemoryRegion;

    /// Read a byte without side effects.
    fn peek(&self, addr: u32) -> u8;

    /// Current CPU program counter.
    fn program_counter(&self) -> u32;

    /// All guards of `kind`, in slot order.
    fn guards(&self, kind: GuardKind) -> Vec<Guard>;

    /// Append an enabled guard.
    fn add_guard(&mut self, kind: GuardKind, addr: u32);

    /// Delete the guard in `slot`. Higher slots move down by one.
    fn remove_guard(&mut self, kind: GuardKind, slot: usize);

    fn set_guard_enabled(&mut self, kind: GuardKind, slot: usize, enabled: bool);

    fn dma_debugger(&self) -> DmaDebuggerInfo;

    fn dma_debug_set_enabled(&mut self, enabled: bool);

    fn dma_debug_set_visualize(&mut self, owner: BusOwner, visualize: bool);

    fn dma_debug_set_color(&mut self, owner: BusOwner, color: Rgb);

    fn dma_debug_set_opacity(&mut self, opacity: f64);

    fn dma_debug_set_display_mode(&mut self, mode: DmaDisplayMode);

    /// First guard of `kind` at `addr`, if any.
    fn guard_at(&self, kind: GuardKind, addr: u32) -> Option<Guard> {
        self.guards(kind).into_iter().find(|g| g.addr == addr)
    }

    fn guard_count(&self, kind: GuardKind) -> usize {
        self.guards(kind).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_owner_index_matches_table_order() {
        for (i, owner) in BusOwner::ALL.iter().enumerate() {
            assert_eq!(owner.index(), i);
        }
    }

    #[test]
    fn rgb_from_unit_clamps() {
        assert_eq!(Rgb::from_unit(1.5, -0.2, 0.5), Rgb::new(255, 0, 128));
        assert_eq!(Rgb::from_unit(f64::NAN, 1.0, 0.0), Rgb::new(0, 255, 0));
    }

    #[test]
    fn display_mode_tags_round_trip() {
        for tag in 0..3 {
            let mode = DmaDisplayMode::from_tag(tag).expect("valid tag");
            assert_eq!(mode.tag(), tag);
        }
        assert_eq!(DmaDisplayMode::from_tag(3), None);
    }

    #[test]
    fn region_names_are_unique() {
        for kind in MemoryRegionKind::ALL {
            assert_eq!(MemoryRegionKind::from_name(kind.name()), Some(kind));
        }
    }
}
