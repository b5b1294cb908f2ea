//! Amiga model configuration and presets.
//!
//! Every field has a sensible default from the model preset. Individual fields
//! can be overridden for expanded or custom configurations.

/// Amiga model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmigaModel {
    /// A1000 (256K chip, Kickstart in write-once memory).
    A1000,
    /// A500 (512K chip, ROM Kickstart).
    A500,
    /// A500+ (1MB chip, battery-backed clock).
    A500Plus,
    /// A2000 (1MB chip, clock, Zorro II slots).
    A2000,
}

impl AmigaModel {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "a1000" => Some(Self::A1000),
            "a500" => Some(Self::A500),
            "a500plus" => Some(Self::A500Plus),
            "a2000" => Some(Self::A2000),
            _ => None,
        }
    }
}

/// How the Kickstart is held.
#[derive(Debug, Clone)]
pub enum KickstartSource {
    /// ROM (soldered or socketed).
    Rom(Vec<u8>),
    /// Write-once memory loaded from floppy (A1000).
    Wom(Vec<u8>),
}

impl KickstartSource {
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match self {
            Self::Rom(data) | Self::Wom(data) => data,
        }
    }
}

/// Full machine configuration.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub model: AmigaModel,
    /// Chip RAM size in bytes (power of two, 256K..=2MB).
    pub chip_ram_size: usize,
    /// Slow (Ranger) RAM size in bytes at $C00000.
    pub slow_ram_size: usize,
    /// Zorro II fast RAM size in bytes at $200000.
    pub fast_ram_size: usize,
    pub kickstart: KickstartSource,
    /// Extended ROM at $E00000 (CDTV/CD32 style), if any.
    pub ext_rom: Option<Vec<u8>>,
    /// Real-time clock at $DC0000.
    pub rtc: bool,
}

impl MachineConfig {
    /// Create a preset configuration for the given model.
    #[must_use]
    pub fn preset(model: AmigaModel, kickstart: Vec<u8>) -> Self {
        match model {
            AmigaModel::A1000 => Self {
                model,
                chip_ram_size: 256 * 1024,
                slow_ram_size: 0,
                fast_ram_size: 0,
                kickstart: KickstartSource::Wom(kickstart),
                ext_rom: None,
                rtc: false,
            },
            AmigaModel::A500 => Self {
                model,
                chip_ram_size: 512 * 1024,
                slow_ram_size: 0,
                fast_ram_size: 0,
                kickstart: KickstartSource::Rom(kickstart),
                ext_rom: None,
                rtc: false,
            },
            AmigaModel::A500Plus => Self {
                model,
                chip_ram_size: 1024 * 1024,
                slow_ram_size: 0,
                fast_ram_size: 0,
                kickstart: KickstartSource::Rom(kickstart),
                ext_rom: None,
                rtc: true,
            },
            AmigaModel::A2000 => Self {
                model,
                chip_ram_size: 1024 * 1024,
                slow_ram_size: 0,
                fast_ram_size: 0,
                kickstart: KickstartSource::Rom(kickstart),
                ext_rom: None,
                rtc: true,
            },
        }
    }
}
