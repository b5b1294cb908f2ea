//! Bus activity (DMA debugger) controls.
//!
//! The panel groups the thirteen physical bus owners into eight controls.
//! Edits on a group fan out to every owner in it under one lock. The
//! master switch only gates the overlay: per-owner flags are untouched.

use emu_core::{BusOwner, DebugTarget, DmaDebuggerInfo, DmaDisplayMode, Rgb};

use crate::engine::EngineHandle;
use crate::error::DebuggerError;
use crate::trace;

/// A bus owner as the panel presents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub enum OwnerGroup {
    Copper,
    Blitter,
    Disk,
    Audio,
    Sprite,
    /// BPL1 through BPL6.
    Bitplanes,
    Cpu,
    Refresh,
}

impl OwnerGroup {
    /// In control tag order.
    pub const ALL: [Self; 8] = [
        Self::Copper,
        Self::Blitter,
        Self::Disk,
        Self::Audio,
        Self::Sprite,
        Self::Bitplanes,
        Self::Cpu,
        Self::Refresh,
    ];

    pub fn from_tag(tag: i64) -> Result<Self, DebuggerError> {
        usize::try_from(tag)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(DebuggerError::InvalidOwnerTag(tag))
    }

    #[must_use]
    pub const fn owners(self) -> &'static [BusOwner] {
        match self {
            Self::Copper => &[BusOwner::Copper],
            Self::Blitter => &[BusOwner::Blitter],
            Self::Disk => &[BusOwner::Disk],
            Self::Audio => &[BusOwner::Audio],
            Self::Sprite => &[BusOwner::Sprite],
            Self::Bitplanes => &[
                BusOwner::Bpl1,
                BusOwner::Bpl2,
                BusOwner::Bpl3,
                BusOwner::Bpl4,
                BusOwner::Bpl5,
                BusOwner::Bpl6,
            ],
            Self::Cpu => &[BusOwner::Cpu],
            Self::Refresh => &[BusOwner::Refresh],
        }
    }

    /// The owner whose settings represent the group.
    #[must_use]
    pub const fn primary(self) -> BusOwner {
        self.owners()[0]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Copper => "copper",
            Self::Blitter => "blitter",
            Self::Disk => "disk",
            Self::Audio => "audio",
            Self::Sprite => "sprite",
            Self::Bitplanes => "bitplanes",
            Self::Cpu => "cpu",
            Self::Refresh => "refresh",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct BusOwnerVisual {
    pub group: OwnerGroup,
    pub visualized: bool,
    pub color: Rgb,
    pub opacity: f64,
    pub display_mode: DmaDisplayMode,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "mcp", derive(serde::Serialize))]
pub struct BusDebugView {
    pub enabled: bool,
    pub opacity: f64,
    pub display_mode: DmaDisplayMode,
    /// One per group, in [`OwnerGroup::ALL`] order.
    pub owners: Vec<BusOwnerVisual>,
}

impl BusDebugView {
    #[must_use]
    pub fn owner(&self, group: OwnerGroup) -> Option<&BusOwnerVisual> {
        self.owners.iter().find(|o| o.group == group)
    }

    /// Group colours for the legend.
    #[must_use]
    pub fn palette(&self) -> Vec<(OwnerGroup, Rgb)> {
        self.owners.iter().map(|o| (o.group, o.color)).collect()
    }
}

impl From<&DmaDebuggerInfo> for BusDebugView {
    fn from(info: &DmaDebuggerInfo) -> Self {
        Self {
            enabled: info.enabled,
            opacity: info.opacity,
            display_mode: info.display_mode,
            owners: OwnerGroup::ALL
                .into_iter()
                .map(|group| BusOwnerVisual {
                    group,
                    visualized: info.visualize(group.primary()),
                    color: info.color(group.primary()),
                    opacity: info.opacity,
                    display_mode: info.display_mode,
                })
                .collect(),
        }
    }
}

pub struct BusActivity<T> {
    engine: EngineHandle<T>,
}

impl<T: DebugTarget> BusActivity<T> {
    pub fn new(engine: EngineHandle<T>) -> Self {
        Self { engine }
    }

    pub fn info(&self) -> BusDebugView {
        BusDebugView::from(&self.engine.with(DebugTarget::dma_debugger))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.engine.with_mut(|t| t.dma_debug_set_enabled(enabled));
        log(format_args!("enabled = {enabled}"));
    }

    pub fn set_visualize(&self, group: OwnerGroup, visualize: bool) {
        self.engine.with_mut(|t| {
            for &owner in group.owners() {
                t.dma_debug_set_visualize(owner, visualize);
            }
        });
        log(format_args!("{} visualize = {visualize}", group.name()));
    }

    pub fn set_color(&self, group: OwnerGroup, color: Rgb) {
        self.engine.with_mut(|t| {
            for &owner in group.owners() {
                t.dma_debug_set_color(owner, color);
            }
        });
        log(format_args!("{} color = #{:06X}", group.name(), color.to_u32()));
    }

    /// Colour-well components in 0.0..=1.0.
    pub fn set_color_unit(&self, group: OwnerGroup, r: f64, g: f64, b: f64) {
        self.set_color(group, Rgb::from_unit(r, g, b));
    }

    pub fn set_opacity(&self, opacity: f64) {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.engine.with_mut(|t| t.dma_debug_set_opacity(opacity));
        log(format_args!("opacity = {opacity:.2}"));
    }

    pub fn set_display_mode(&self, mode: DmaDisplayMode) {
        self.engine.with_mut(|t| t.dma_debug_set_display_mode(mode));
        log(format_args!("display mode = {mode:?}"));
    }

    pub fn set_display_mode_tag(&self, tag: i64) -> Result<(), DebuggerError> {
        let mode = DmaDisplayMode::from_tag(tag).ok_or(DebuggerError::InvalidDisplayMode(tag))?;
        self.set_display_mode(mode);
        Ok(())
    }

    pub fn palette(&self) -> Vec<(OwnerGroup, Rgb)> {
        self.info().palette()
    }
}

fn log(args: std::fmt::Arguments<'_>) {
    if trace::enabled() {
        eprintln!("[debugger] bus {args}");
    }
}
