//! Debugger views against an engine advancing on another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use amiga_debugger::{Command, Debugger, DebuggerConfig, DebuggerError, EngineHandle, NavTarget};
use emu_core::{DebugTarget, GuardKind, MemoryRegionKind};
use machine_amiga::{Amiga, AmigaModel, MachineConfig, Step};

fn looping_amiga() -> Amiga {
    let config = MachineConfig::preset(AmigaModel::A500, vec![0; 256 * 1024]);
    let mut amiga = Amiga::new(&config).expect("valid config");
    // nop x 8 from $1000
    amiga.memory.load(0x1000, &[0x4E, 0x71].repeat(8));
    amiga.set_pc(0x1000);
    amiga
}

#[test]
fn views_stay_consistent_while_engine_runs() {
    let shared = Arc::new(Mutex::new(looping_amiga()));
    let running = Arc::new(AtomicBool::new(true));

    let engine_thread = {
        let shared = Arc::clone(&shared);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                let mut amiga = shared.lock().expect("engine lock");
                if amiga.pc() >= 0x1010 {
                    amiga.set_pc(0x1000);
                }
                if let Step::Breakpoint(addr) = amiga.advance_pc() {
                    assert!(amiga.guard_at(GuardKind::Breakpoint, addr).is_some());
                }
            }
        })
    };

    let mut dbg = Debugger::new(
        EngineHandle::from_shared(Arc::clone(&shared)),
        DebuggerConfig::default().with_window_rows(8),
    );
    dbg.apply(Command::Navigate(NavTarget::Address(0x1000)))
        .expect("valid address");

    for i in 0..200u32 {
        let address = 0x1000 + (i % 8) * 2;
        match dbg.apply(Command::SetBreakpoint { kind: GuardKind::Breakpoint, address }) {
            Ok(()) => {}
            Err(DebuggerError::DuplicateBreakpoint(_)) => {
                dbg.apply(Command::RemoveBreakpoint { kind: GuardKind::Breakpoint, slot: 0 })
                    .expect("non-empty list");
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
        dbg.apply(Command::Refresh).expect("fixed anchor");

        // One window, one engine state: all rows contiguous from the origin.
        let rows = dbg.window().rows();
        assert_eq!(rows.len(), 8);
        for pair in rows.windows(2) {
            assert_eq!(pair[1].address.get(), pair[0].address.get() + pair[0].bytes);
        }
    }

    running.store(false, Ordering::Relaxed);
    engine_thread.join().expect("engine thread");

    let listed = dbg.registry(GuardKind::Breakpoint).entries().len();
    let engine_count = dbg.engine().with(|a| a.guard_count(GuardKind::Breakpoint));
    assert_eq!(listed, engine_count);
}

#[test]
fn snapshot_bank_strip_is_taken_under_one_lock() {
    let shared = Arc::new(Mutex::new(looping_amiga()));
    let flipper = {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            for _ in 0..500 {
                let mut amiga = shared.lock().expect("engine lock");
                amiga.memory.overlay = !amiga.memory.overlay;
            }
        })
    };

    let dbg = Debugger::new(
        EngineHandle::from_shared(Arc::clone(&shared)),
        DebuggerConfig::default(),
    );
    for _ in 0..100 {
        let strip = dbg.snapshot().bank_strip;
        // Overlay covers banks 0-3 for a 256K ROM: all or none of them.
        let overlaid = strip[..4]
            .iter()
            .filter(|b| b.mirrored && b.kind == MemoryRegionKind::Rom)
            .count();
        assert!(overlaid == 0 || overlaid == 4, "torn strip: {overlaid}");
    }
    flipper.join().expect("flipper thread");
}
