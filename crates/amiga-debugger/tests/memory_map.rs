//! Region classification and bank navigation.

mod common;

use amiga_debugger::{
    Address, Classifier, Command, Debugger, DebuggerConfig, DebuggerError, EngineHandle,
    NavTarget,
};
use common::MockTarget;
use emu_core::{MemoryRegion, MemoryRegionKind};
use machine_amiga::{Amiga, AmigaModel, MachineConfig};

fn a500() -> Amiga {
    Amiga::new(&MachineConfig::preset(AmigaModel::A500, vec![0; 512 * 1024]))
        .expect("valid config")
}

#[test]
fn bank_zero_is_primary_chip_ram() {
    let classifier = Classifier::new(EngineHandle::new(a500()));
    let region = classifier.classify(Address::ZERO);
    assert_eq!(region.kind, MemoryRegionKind::Chip);
    assert!(!region.mirrored);
}

#[test]
fn unbacked_address_is_unmapped() {
    let classifier = Classifier::new(EngineHandle::new(a500()));
    // No fast RAM fitted on a stock A500
    assert_eq!(
        classifier.classify_raw(0x0020_0000),
        Ok(MemoryRegion::UNMAPPED)
    );

    let mock = Classifier::new(EngineHandle::new(MockTarget::new()));
    assert_eq!(mock.classify_raw(0x0012_3456), Ok(MemoryRegion::UNMAPPED));
}

#[test]
fn chip_ram_beyond_installed_size_is_mirrored() {
    let classifier = Classifier::new(EngineHandle::new(a500()));
    let strip = classifier.bank_strip();
    assert!(strip[..8].iter().all(|r| *r == MemoryRegion::primary(MemoryRegionKind::Chip)));
    assert_eq!(strip[8], MemoryRegion::mirror(MemoryRegionKind::Chip));
}

#[test]
fn region_jump_without_match_is_a_no_op() {
    let mut dbg = Debugger::new(EngineHandle::new(a500()), DebuggerConfig::default());
    dbg.apply(Command::Navigate(NavTarget::Bank(0xBF))).expect("valid bank");
    let before = dbg.navigator().memory_view();

    assert_eq!(dbg.jump_to_region(MemoryRegionKind::Fast), Ok(None));
    dbg.apply(Command::Navigate(NavTarget::Region(MemoryRegionKind::Ext)))
        .expect("no match is not an error");
    assert_eq!(dbg.navigator().memory_view(), before);
}

#[test]
fn region_jump_prefers_primary_bank() {
    let mut dbg = Debugger::new(EngineHandle::new(a500()), DebuggerConfig::default());
    assert_eq!(dbg.jump_to_region(MemoryRegionKind::Rom), Ok(Some(0xF8)));
    // $A00000 echoes the CIAs, but $BF0000 is the real thing
    assert_eq!(dbg.jump_to_region(MemoryRegionKind::Cia), Ok(Some(0xBF)));
    assert_eq!(
        dbg.navigator().memory_view().region,
        MemoryRegion::primary(MemoryRegionKind::Cia)
    );
    assert_eq!(dbg.jump_to_region(MemoryRegionKind::Custom), Ok(Some(0xDF)));
}

#[test]
fn region_jump_skips_overlay_mirror() {
    let mut amiga = a500();
    amiga.reset();
    let mut dbg = Debugger::new(EngineHandle::new(amiga), DebuggerConfig::default());
    assert_eq!(dbg.jump_to_region(MemoryRegionKind::Rom), Ok(Some(0xF8)));
    assert!(!dbg.navigator().memory_view().region.mirrored);
}

#[test]
fn region_jump_falls_back_to_mirror() {
    let mut target = MockTarget::new();
    target.regions[0x40] = MemoryRegion::mirror(MemoryRegionKind::Ext);
    let mut dbg = Debugger::new(EngineHandle::new(target), DebuggerConfig::default());
    assert_eq!(dbg.jump_to_region(MemoryRegionKind::Ext), Ok(Some(0x40)));
    assert!(dbg.navigator().memory_view().region.mirrored);
}

#[test]
fn bank_out_of_range_is_rejected() {
    let mut dbg = Debugger::new(EngineHandle::new(a500()), DebuggerConfig::default());
    assert_eq!(
        dbg.apply(Command::Navigate(NavTarget::Bank(300))),
        Err(DebuggerError::InvalidBank(300))
    );
    assert_eq!(dbg.navigator().memory_view().bank, 0);
}

#[test]
fn strip_follows_reconfiguration() {
    let dbg = Debugger::new(EngineHandle::new(a500()), DebuggerConfig::default());
    assert_eq!(dbg.snapshot().bank_strip[0xC0].kind, MemoryRegionKind::Custom);

    let mut config = MachineConfig::preset(AmigaModel::A500, vec![0; 512 * 1024]);
    config.slow_ram_size = 512 * 1024;
    dbg.engine()
        .with_mut(|a| a.reconfigure(&config))
        .expect("valid config");
    let strip = dbg.snapshot().bank_strip;
    assert_eq!(strip[0xC0].kind, MemoryRegionKind::Slow);
    assert!(!strip[0xC0].mirrored);
    assert!(strip[0xC8].mirrored);
}

#[test]
fn memory_panel_reads_through_engine() {
    let mut amiga = a500();
    amiga.memory.load(0x0004_0120, b"AMIGA");
    let mut dbg = Debugger::new(EngineHandle::new(amiga), DebuggerConfig::default());
    dbg.apply(Command::Navigate(NavTarget::MemoryAddress(0x0004_0122)))
        .expect("valid address");

    let view = dbg.navigator().memory_view();
    assert_eq!((view.bank, view.line), (4, 0x12));
    let lines = dbg.memory_lines(view.line..view.line + 1);
    assert_eq!(&lines[0].bytes[..5], b"AMIGA");
}
