#![no_main]

use chatui_harness::MemoryHost;
use chatui_layout::{BufferHost, LayoutState, WindowHost};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Byte pairs drive a live screen: split, focus or show buffers.
    let mut live = MemoryHost::new();
    live.set_max_windows(Some(32));
    for name in ["#a", "#b", "#c", "#d"] {
        live.add_buffer("irc", name);
    }
    for pair in data.chunks_exact(2) {
        let windows = live.windows();
        let window = windows[pair[1] as usize % windows.len()];
        match pair[0] % 4 {
            0 => {
                let _ = live.split_horizontal(window, pair[0] / 4 + 1);
            }
            1 => {
                let _ = live.split_vertical(window, pair[0] / 4 + 1);
            }
            2 => live.switch_to_window(window),
            _ => {
                let buffers = live.buffer_ids();
                let buffer = buffers[pair[0] as usize % buffers.len()];
                live.switch_to_buffer(window, buffer);
            }
        }
    }

    let mut state = LayoutState::new();
    state.save_buffers(&live);
    let focused = state.save_windows(&live);
    assert!(focused.is_some(), "live focus must map to a leaf");

    // Rebuild on an unbounded screen holding the same buffers.
    let mut next = MemoryHost::new();
    for name in ["#d", "#c", "#b", "#a"] {
        next.add_buffer("irc", name);
    }
    state.apply_buffers(&mut next);
    assert_eq!(next.buffer_names(), live.buffer_names());

    let report = state.apply_windows(&mut next);
    assert_eq!(report.failed_splits, 0);
    assert!(report.focus_matched);
    assert_eq!(next.shape().skeleton(), live.shape().skeleton());
    assert_eq!(next.shape().leaf_buffers(), live.shape().leaf_buffers());
    assert_eq!(
        next.window_buffer_key(next.current()),
        live.window_buffer_key(live.current())
    );
});
