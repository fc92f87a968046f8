#![no_main]

use chatui_harness::MemoryHost;
use chatui_layout::{LayoutSnapshot, LayoutState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary layout files must be rejected or restored, never panic.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = LayoutSnapshot::from_json_str(text) else {
        return;
    };
    let Ok(state) = LayoutState::from_snapshot(&snapshot) else {
        return;
    };

    // A restored state survives its own round trip.
    let json = state.to_snapshot().to_json_string().expect("restored state serializes");
    let again = LayoutSnapshot::from_json_str(&json).expect("own output parses");
    let restored = LayoutState::from_snapshot(&again).expect("own output validates");
    assert_eq!(restored, state, "snapshot round trip changed state");

    let _ = state.dump();

    let mut host = MemoryHost::new();
    host.set_max_windows(Some(64));
    state.apply_buffers(&mut host);
    let report = state.apply_windows(&mut host);
    assert_eq!(report.splits + report.failed_splits, state.windows().split_count());
    assert_eq!(report.leaves, state.windows().leaf_count());
});
