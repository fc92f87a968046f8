#![forbid(unsafe_code)]

//! Ready-made screens for layout tests and benchmarks.

use chatui_layout::WindowHost;

use crate::{BufferId, MemoryHost, WindowId};

/// Handles into [`status_and_channels`].
#[derive(Debug, Clone, Copy)]
pub struct StatusAndChannels {
    pub status: BufferId,
    pub chan_a: BufferId,
    pub chan_b: BufferId,
    pub status_window: WindowId,
    pub chan_a_window: WindowId,
    pub chan_b_window: WindowId,
}

/// Root split horizontally at 50 with `core/status` on the first side and a
/// 30% vertical split on the second side showing `irc/#a` and `irc/#b`.
/// Focus is on `irc/#b`.
#[must_use]
pub fn status_and_channels() -> (MemoryHost, StatusAndChannels) {
    let mut host = MemoryHost::new();
    let status = host.add_buffer("core", "status");
    let chan_a = host.add_buffer("irc", "#a");
    let chan_b = host.add_buffer("irc", "#b");

    let status_window = host.current();
    host.switch_to_buffer(status_window, status);
    let chan_a_window = host
        .split_horizontal(status_window, 50)
        .unwrap_or(status_window);
    host.switch_to_buffer(chan_a_window, chan_a);
    let chan_b_window = host
        .split_vertical(chan_a_window, 30)
        .unwrap_or(chan_a_window);
    host.switch_to_buffer(chan_b_window, chan_b);
    host.switch_to_window(chan_b_window);
    host.clear_ops();

    (
        host,
        StatusAndChannels {
            status,
            chan_a,
            chan_b,
            status_window,
            chan_a_window,
            chan_b_window,
        },
    )
}

/// Deterministic split tree with `depth` levels, alternating orientation.
///
/// Each leaf shows its own `irc/#chanN` buffer. Focus ends on the last
/// window created.
#[must_use]
pub fn nested_splits(depth: usize) -> MemoryHost {
    let mut host = MemoryHost::new();
    let mut pending = vec![host.current()];
    let mut channel = 0usize;
    for level in 0..depth {
        let mut next = Vec::with_capacity(pending.len() * 2);
        for window in pending {
            let pct = 20 + ((level * 13 + channel * 7) % 60) as u8;
            let created = if level % 2 == 0 {
                host.split_horizontal(window, pct)
            } else {
                host.split_vertical(window, pct)
            };
            next.push(window);
            if let Some(created) = created {
                next.push(created);
            }
            channel += 1;
        }
        pending = next;
    }
    for (index, window) in pending.iter().enumerate() {
        let buffer = host.add_buffer("irc", &format!("#chan{index}"));
        host.switch_to_buffer(*window, buffer);
    }
    host.clear_ops();
    host
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Skeleton;

    #[test]
    fn status_and_channels_shape() {
        let (host, handles) = status_and_channels();
        let leaf = || Box::new(Skeleton::Leaf);
        assert_eq!(
            host.shape().skeleton(),
            Skeleton::Split(50, true, leaf(), Box::new(Skeleton::Split(30, false, leaf(), leaf())))
        );
        assert_eq!(host.current(), handles.chan_b_window);
        assert!(host.ops().is_empty());
    }

    #[test]
    fn nested_splits_has_power_of_two_leaves() {
        let host = nested_splits(3);
        assert_eq!(host.window_count(), 8);
        assert_eq!(host.shape().leaf_buffers().len(), 8);
    }
}
