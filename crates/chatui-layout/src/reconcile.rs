#![forbid(unsafe_code)]

//! Binding live buffers to windows that carry a pending layout target.
//!
//! Two entry points with different breadth:
//!
//! - [`check_all_buffers`] runs once after a tree replay and binds at most one
//!   buffer per window: the first live buffer whose identity matches.
//! - [`check_one_buffer`] runs whenever a buffer appears later and binds it
//!   into every window waiting for it.
//!
//! Matching here is exact (case-sensitive), unlike buffer number lookup.

use crate::host::WindowHost;

/// Bind `buffer` into every window whose pending target names it.
///
/// Returns the number of windows bound.
pub fn check_one_buffer<H: WindowHost>(host: &mut H, buffer: H::BufferId) -> usize {
    let Some(key) = host.buffer(buffer).map(|view| view.key()) else {
        return 0;
    };

    let waiting: Vec<H::Window> = host
        .windows()
        .into_iter()
        .filter(|window| {
            host.layout_target(*window)
                .is_some_and(|target| target.matches(&key.plugin_name, &key.buffer_name))
        })
        .collect();

    for window in &waiting {
        host.switch_to_buffer(*window, buffer);
    }
    if !waiting.is_empty() {
        tracing::debug!(
            target: "chatui.layout",
            buffer = %key,
            windows = waiting.len(),
            "buffer bound to waiting windows"
        );
    }
    waiting.len()
}

/// For every window with a pending target, bind the first live buffer that
/// matches it.
///
/// Returns the number of windows bound.
pub fn check_all_buffers<H: WindowHost>(host: &mut H) -> usize {
    let mut bound = 0;
    for window in host.windows() {
        let Some(target) = host.layout_target(window) else {
            continue;
        };
        let found = host.buffer_ids().into_iter().find(|buffer| {
            host.buffer(*buffer)
                .is_some_and(|view| target.matches(view.plugin_name, view.buffer_name))
        });
        if let Some(buffer) = found {
            host.switch_to_buffer(window, buffer);
            bound += 1;
        }
    }
    tracing::debug!(target: "chatui.layout", bound, "pending windows reconciled");
    bound
}
