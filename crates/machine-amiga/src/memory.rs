//! Amiga memory map.
//!
//! Memory map (24-bit address bus, 64K banks):
//! - $000000-$1FFFFF: Chip RAM (wraps at the installed size)
//! - $200000-$9FFFFF: Zorro II fast RAM (once autoconfigured)
//! - $A00000-$BFFFFF: CIAs ($BF is primary, the rest echo it)
//! - $C00000-$D7FFFF: Slow (Ranger) RAM, or custom chip echoes without it
//! - $DC0000-$DCFFFF: Real-time clock
//! - $DF0000-$DFFFFF: Custom chip registers
//! - $E00000-$E7FFFF: Extended ROM
//! - $E80000-$E8FFFF: Autoconfig space while a board is unconfigured
//! - $F80000-$FFFFFF: Kickstart ROM/WOM (256K images appear twice)
//!
//! With the overlay set, Kickstart also appears at $000000.

use emu_core::{ADDRESS_MASK, BANK_COUNT, MemoryRegion, MemoryRegionKind};

use crate::MachineError;
use crate::config::{KickstartSource, MachineConfig};

pub const BANK_SIZE: usize = 0x1_0000;

const CHIP_FIRST_BANK: usize = 0x00;
const CHIP_LAST_BANK: usize = 0x1F;
const FAST_FIRST_BANK: usize = 0x20;
const FAST_LAST_BANK: usize = 0x9F;
const CIA_FIRST_BANK: usize = 0xA0;
const CIA_PRIMARY_BANK: usize = 0xBF;
const SLOW_FIRST_BANK: usize = 0xC0;
const SLOW_LAST_BANK: usize = 0xD7;
const RTC_BANK: usize = 0xDC;
const CUSTOM_BANK: usize = 0xDF;
const EXT_FIRST_BANK: usize = 0xE0;
const EXT_LAST_BANK: usize = 0xE7;
const AUTOCONFIG_BANK: usize = 0xE8;
const KICKSTART_FIRST_BANK: usize = 0xF8;

/// Open-bus value for unmapped or register space.
const OPEN_BUS: u8 = 0xFF;

/// Backing storage plus the switches that change the memory map.
pub struct Memory {
    pub chip_ram: Vec<u8>,
    pub slow_ram: Vec<u8>,
    pub fast_ram: Vec<u8>,
    kickstart: Vec<u8>,
    /// Kickstart lives in write-once memory rather than ROM.
    kickstart_wom: bool,
    ext_rom: Vec<u8>,
    rtc: bool,
    /// When true, Kickstart is mapped at $000000 (reset overlay).
    pub overlay: bool,
    /// When false, the fast RAM board still sits in autoconfig space.
    pub zorro_configured: bool,
}

impl Memory {
    /// Create memory from the given configuration.
    pub fn new(config: &MachineConfig) -> Result<Self, MachineError> {
        let kickstart = config.kickstart.data();
        if !matches!(kickstart.len(), 0x4_0000 | 0x8_0000) {
            return Err(MachineError::KickstartSize(kickstart.len()));
        }
        check_ram("chip", config.chip_ram_size, 256 * 1024, 2 * 1024 * 1024, false)?;
        check_ram("slow", config.slow_ram_size, BANK_SIZE, 0x18_0000, true)?;
        check_ram("fast", config.fast_ram_size, BANK_SIZE, 8 * 1024 * 1024, true)?;
        if let Some(ext) = &config.ext_rom {
            if ext.is_empty() || ext.len() > 0x8_0000 || ext.len() % BANK_SIZE != 0 {
                return Err(MachineError::ExtRomSize(ext.len()));
            }
        }

        Ok(Self {
            chip_ram: vec![0; config.chip_ram_size],
            slow_ram: vec![0; config.slow_ram_size],
            fast_ram: vec![0; config.fast_ram_size],
            kickstart: kickstart.to_vec(),
            kickstart_wom: matches!(config.kickstart, KickstartSource::Wom(_)),
            ext_rom: config.ext_rom.clone().unwrap_or_default(),
            rtc: config.rtc,
            overlay: false,
            zorro_configured: true,
        })
    }

    fn kickstart_banks(&self) -> usize {
        self.kickstart.len() / BANK_SIZE
    }

    fn kickstart_kind(&self) -> MemoryRegionKind {
        if self.kickstart_wom {
            MemoryRegionKind::Wom
        } else {
            MemoryRegionKind::Rom
        }
    }

    /// Classify one 64K bank.
    #[must_use]
    pub fn region(&self, bank: usize) -> MemoryRegion {
        use MemoryRegionKind as K;

        match bank {
            _ if self.overlay && bank < self.kickstart_banks() => {
                MemoryRegion::mirror(self.kickstart_kind())
            }
            CHIP_FIRST_BANK..=CHIP_LAST_BANK => {
                // Agnus ignores the upper address lines, so chip RAM echoes.
                if bank < self.chip_ram.len() / BANK_SIZE {
                    MemoryRegion::primary(K::Chip)
                } else {
                    MemoryRegion::mirror(K::Chip)
                }
            }
            FAST_FIRST_BANK..=FAST_LAST_BANK => {
                if self.zorro_configured && bank - FAST_FIRST_BANK < self.fast_ram.len() / BANK_SIZE
                {
                    MemoryRegion::primary(K::Fast)
                } else {
                    MemoryRegion::UNMAPPED
                }
            }
            CIA_PRIMARY_BANK => MemoryRegion::primary(K::Cia),
            CIA_FIRST_BANK..CIA_PRIMARY_BANK => MemoryRegion::mirror(K::Cia),
            SLOW_FIRST_BANK..=SLOW_LAST_BANK => {
                let slow_banks = self.slow_ram.len() / BANK_SIZE;
                if slow_banks == 0 {
                    MemoryRegion::mirror(K::Custom)
                } else if bank - SLOW_FIRST_BANK < slow_banks {
                    MemoryRegion::primary(K::Slow)
                } else {
                    MemoryRegion::mirror(K::Slow)
                }
            }
            RTC_BANK if self.rtc => MemoryRegion::primary(K::Rtc),
            CUSTOM_BANK => MemoryRegion::primary(K::Custom),
            EXT_FIRST_BANK..=EXT_LAST_BANK => {
                if bank - EXT_FIRST_BANK < self.ext_rom.len() / BANK_SIZE {
                    MemoryRegion::primary(K::Ext)
                } else {
                    MemoryRegion::UNMAPPED
                }
            }
            AUTOCONFIG_BANK if !self.zorro_configured && !self.fast_ram.is_empty() => {
                MemoryRegion::primary(K::AutoConfig)
            }
            KICKSTART_FIRST_BANK..BANK_COUNT => {
                if bank - KICKSTART_FIRST_BANK < self.kickstart_banks() {
                    MemoryRegion::primary(self.kickstart_kind())
                } else {
                    MemoryRegion::mirror(self.kickstart_kind())
                }
            }
            _ => MemoryRegion::UNMAPPED,
        }
    }

    /// Read a byte without side effects. Register space reads as open bus.
    #[must_use]
    pub fn peek(&self, addr: u32) -> u8 {
        let addr = (addr & ADDRESS_MASK) as usize;
        let bank = addr / BANK_SIZE;

        match self.region(bank).kind {
            MemoryRegionKind::Chip => self.chip_ram[addr % self.chip_ram.len()],
            MemoryRegionKind::Fast => self.fast_ram[addr - FAST_FIRST_BANK * BANK_SIZE],
            MemoryRegionKind::Slow => {
                self.slow_ram[(addr - SLOW_FIRST_BANK * BANK_SIZE) % self.slow_ram.len()]
            }
            MemoryRegionKind::Rom | MemoryRegionKind::Wom => {
                self.kickstart[addr % self.kickstart.len()]
            }
            MemoryRegionKind::Ext => self.ext_rom[addr - EXT_FIRST_BANK * BANK_SIZE],
            _ => OPEN_BUS,
        }
    }

    /// Big-endian word at `addr`, wrapping at the top of the address space.
    #[must_use]
    pub fn peek_word(&self, addr: u32) -> u16 {
        u16::from(self.peek(addr)) << 8 | u16::from(self.peek(addr.wrapping_add(1)))
    }

    /// Write a byte. ROM and register space ignore writes; WOM accepts them.
    pub fn poke(&mut self, addr: u32, value: u8) {
        let addr = (addr & ADDRESS_MASK) as usize;
        let bank = addr / BANK_SIZE;

        match self.region(bank).kind {
            MemoryRegionKind::Chip => {
                let len = self.chip_ram.len();
                self.chip_ram[addr % len] = value;
            }
            MemoryRegionKind::Fast => self.fast_ram[addr - FAST_FIRST_BANK * BANK_SIZE] = value,
            MemoryRegionKind::Slow => {
                let len = self.slow_ram.len();
                self.slow_ram[(addr - SLOW_FIRST_BANK * BANK_SIZE) % len] = value;
            }
            MemoryRegionKind::Wom => {
                let len = self.kickstart.len();
                self.kickstart[addr % len] = value;
            }
            _ => {}
        }
    }

    /// Store a run of bytes starting at `addr`.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.poke(addr.wrapping_add(i as u32), b);
        }
    }
}

fn check_ram(
    name: &'static str,
    size: usize,
    min: usize,
    max: usize,
    optional: bool,
) -> Result<(), MachineError> {
    if optional && size == 0 {
        return Ok(());
    }
    if size < min || size > max || size % BANK_SIZE != 0 {
        return Err(MachineError::RamSize { name, size });
    }
    if name == "chip" && !size.is_power_of_two() {
        return Err(MachineError::RamSize { name, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmigaModel;

    fn a500() -> MachineConfig {
        MachineConfig::preset(AmigaModel::A500, vec![0u8; 256 * 1024])
    }

    #[test]
    fn chip_ram_bank_zero_is_primary() {
        let mem = Memory::new(&a500()).expect("valid");
        assert_eq!(mem.region(0), MemoryRegion::primary(MemoryRegionKind::Chip));
        assert_eq!(mem.region(7), MemoryRegion::primary(MemoryRegionKind::Chip));
        assert_eq!(mem.region(8), MemoryRegion::mirror(MemoryRegionKind::Chip));
    }

    #[test]
    fn overlay_maps_kickstart_at_zero() {
        let mut mem = Memory::new(&a500()).expect("valid");
        mem.overlay = true;
        assert_eq!(mem.region(0), MemoryRegion::mirror(MemoryRegionKind::Rom));
        assert_eq!(mem.region(4), MemoryRegion::primary(MemoryRegionKind::Chip));
    }

    #[test]
    fn small_kickstart_echoes_in_upper_half() {
        let mem = Memory::new(&a500()).expect("valid");
        assert_eq!(mem.region(0xF8), MemoryRegion::primary(MemoryRegionKind::Rom));
        assert_eq!(mem.region(0xFC), MemoryRegion::mirror(MemoryRegionKind::Rom));
    }

    #[test]
    fn cia_and_custom_space() {
        let mem = Memory::new(&a500()).expect("valid");
        assert_eq!(mem.region(0xBF), MemoryRegion::primary(MemoryRegionKind::Cia));
        assert_eq!(mem.region(0xA0), MemoryRegion::mirror(MemoryRegionKind::Cia));
        assert_eq!(mem.region(0xDF), MemoryRegion::primary(MemoryRegionKind::Custom));
        assert_eq!(mem.region(0xC0), MemoryRegion::mirror(MemoryRegionKind::Custom));
        assert_eq!(mem.region(0xDC), MemoryRegion::UNMAPPED);
        assert_eq!(mem.region(0x50), MemoryRegion::UNMAPPED);
    }

    #[test]
    fn slow_ram_replaces_custom_echo() {
        let mut config = a500();
        config.slow_ram_size = 512 * 1024;
        let mem = Memory::new(&config).expect("valid");
        assert_eq!(mem.region(0xC0), MemoryRegion::primary(MemoryRegionKind::Slow));
        assert_eq!(mem.region(0xC8), MemoryRegion::mirror(MemoryRegionKind::Slow));
    }

    #[test]
    fn unconfigured_board_shows_autoconfig() {
        let mut config = a500();
        config.fast_ram_size = 2 * 1024 * 1024;
        let mut mem = Memory::new(&config).expect("valid");
        assert_eq!(mem.region(0x20), MemoryRegion::primary(MemoryRegionKind::Fast));
        assert_eq!(mem.region(AUTOCONFIG_BANK), MemoryRegion::UNMAPPED);

        mem.zorro_configured = false;
        assert_eq!(mem.region(0x20), MemoryRegion::UNMAPPED);
        assert_eq!(
            mem.region(AUTOCONFIG_BANK),
            MemoryRegion::primary(MemoryRegionKind::AutoConfig)
        );
    }

    #[test]
    fn chip_ram_wraps_at_installed_size() {
        let mut mem = Memory::new(&a500()).expect("valid");
        mem.poke(0x00_0100, 0x42);
        assert_eq!(mem.peek(0x08_0100), 0x42, "should echo at 512K boundary");
    }

    #[test]
    fn rom_ignores_writes_but_wom_accepts_them() {
        let mut mem = Memory::new(&a500()).expect("valid");
        mem.poke(0xF8_0010, 0xAB);
        assert_eq!(mem.peek(0xF8_0010), 0x00);

        let config = MachineConfig::preset(AmigaModel::A1000, vec![0u8; 256 * 1024]);
        let mut mem = Memory::new(&config).expect("valid");
        mem.poke(0xF8_0010, 0xAB);
        assert_eq!(mem.peek(0xF8_0010), 0xAB);
        assert_eq!(mem.region(0xF8).kind, MemoryRegionKind::Wom);
    }

    #[test]
    fn invalid_sizes_rejected() {
        let mut config = a500();
        config.kickstart = KickstartSource::Rom(vec![0u8; 1024]);
        assert!(matches!(Memory::new(&config), Err(MachineError::KickstartSize(1024))));

        let mut config = a500();
        config.chip_ram_size = 384 * 1024;
        assert!(matches!(Memory::new(&config), Err(MachineError::RamSize { .. })));
    }

    #[test]
    fn register_space_reads_open_bus() {
        let mem = Memory::new(&a500()).expect("valid");
        assert_eq!(mem.peek(0xDF_F006), 0xFF);
        assert_eq!(mem.peek(0x50_0000), 0xFF);
    }
}
