//! DMA debugger settings.
//!
//! Agnus records which owner used each chip bus slot. The debugger overlay
//! tints those slots on the picture. This module only holds the settings;
//! per-owner flags survive toggling the master switch.

use emu_core::{BusOwner, DmaDebuggerInfo, DmaDisplayMode, Rgb};

const DEFAULT_COLORS: [Rgb; BusOwner::COUNT] = [
    Rgb::new(0xFF, 0xFF, 0xFF), // CPU
    Rgb::new(0xFF, 0x00, 0x00), // refresh
    Rgb::new(0x00, 0xFF, 0x00), // disk
    Rgb::new(0xFF, 0x00, 0xFF), // audio
    Rgb::new(0x00, 0xCC, 0xFF), // BPL1
    Rgb::new(0x00, 0xCC, 0xFF),
    Rgb::new(0x00, 0xCC, 0xFF),
    Rgb::new(0x00, 0xCC, 0xFF),
    Rgb::new(0x00, 0xCC, 0xFF),
    Rgb::new(0x00, 0xCC, 0xFF), // BPL6
    Rgb::new(0x00, 0x88, 0xFF), // sprite
    Rgb::new(0xFF, 0xFF, 0x00), // copper
    Rgb::new(0xFF, 0xCC, 0x00), // blitter
];

pub struct DmaDebugger {
    info: DmaDebuggerInfo,
}

impl Default for DmaDebugger {
    fn default() -> Self {
        Self {
            info: DmaDebuggerInfo {
                enabled: false,
                visualize: [true; BusOwner::COUNT],
                color: DEFAULT_COLORS,
                opacity: 0.5,
                display_mode: DmaDisplayMode::ForegroundLayer,
            },
        }
    }
}

impl DmaDebugger {
    #[must_use]
    pub fn info(&self) -> DmaDebuggerInfo {
        self.info
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.info.enabled = enabled;
    }

    pub fn set_visualize(&mut self, owner: BusOwner, visualize: bool) {
        self.info.visualize[owner.index()] = visualize;
    }

    pub fn set_color(&mut self, owner: BusOwner, color: Rgb) {
        self.info.color[owner.index()] = color;
    }

    /// Clamped to 0.0..=1.0.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.info.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn set_display_mode(&mut self, mode: DmaDisplayMode) {
        self.info.display_mode = mode;
    }

    /// Overlay colour for a slot, or `None` when the overlay hides it.
    #[must_use]
    pub fn slot_color(&self, owner: BusOwner) -> Option<Rgb> {
        (self.info.enabled && self.info.visualize[owner.index()])
            .then(|| self.info.color[owner.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_switch_gates_without_clearing() {
        let mut dma = DmaDebugger::default();
        dma.set_visualize(BusOwner::Copper, false);
        dma.set_enabled(true);
        assert_eq!(dma.slot_color(BusOwner::Copper), None);
        assert!(dma.slot_color(BusOwner::Blitter).is_some());

        dma.set_enabled(false);
        assert_eq!(dma.slot_color(BusOwner::Blitter), None);
        assert!(dma.info().visualize(BusOwner::Blitter));
        assert!(!dma.info().visualize(BusOwner::Copper));
    }

    #[test]
    fn opacity_is_clamped() {
        let mut dma = DmaDebugger::default();
        dma.set_opacity(1.7);
        assert!((dma.info().opacity - 1.0).abs() < f64::EPSILON);
        dma.set_opacity(f64::NAN);
        assert!(dma.info().opacity.abs() < f64::EPSILON);
    }
}
