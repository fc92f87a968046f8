#![forbid(unsafe_code)]

//! Human-readable dump of the layout stores, for crash logs.
//!
//! The dump never fails and never mutates: empty stores produce a short
//! header only.

use std::fmt::Write as _;

use crate::buffer_layout::BufferLayout;
use crate::window_layout::{LayoutId, WindowLayout};

fn opt_id(id: Option<LayoutId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

/// Render every buffer entry and a preorder walk of the window tree.
#[must_use]
pub fn dump(buffers: &BufferLayout, windows: &WindowLayout, current: Option<LayoutId>) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "[layout] buffers: {}, windows: {}, current window: {}",
        buffers.len(),
        windows.len(),
        opt_id(current)
    );

    for (index, entry) in buffers.entries().iter().enumerate() {
        let _ = writeln!(s);
        let _ = writeln!(s, "[layout buffer (index:{index})]");
        let _ = writeln!(s, "  plugin_name. . . . . . : '{}'", entry.plugin_name());
        let _ = writeln!(s, "  buffer_name. . . . . . : '{}'", entry.buffer_name());
        let _ = writeln!(s, "  number . . . . . . . . : {}", entry.number());
    }

    for (level, node) in windows.preorder_with_depth() {
        let (plugin_name, buffer_name) = node
            .buffer()
            .map_or(("", ""), |key| (key.plugin_name.as_str(), key.buffer_name.as_str()));
        let _ = writeln!(s);
        let _ = writeln!(
            s,
            "[layout window (id:{}) ({}) (level {level})]",
            node.id,
            if node.is_leaf() { "leaf" } else { "node" }
        );
        let _ = writeln!(s, "  internal_id. . . . . . : {}", node.id);
        let _ = writeln!(s, "  parent_id. . . . . . . : {}", opt_id(node.parent));
        let _ = writeln!(s, "  split_pct. . . . . . . : {}", node.split_pct());
        let _ = writeln!(s, "  split_horiz. . . . . . : {}", u8::from(node.split_horizontal()));
        let _ = writeln!(s, "  child1 . . . . . . . . : {}", opt_id(node.child1()));
        let _ = writeln!(s, "  child2 . . . . . . . . : {}", opt_id(node.child2()));
        let _ = writeln!(s, "  plugin_name. . . . . . : '{plugin_name}'");
        let _ = writeln!(s, "  buffer_name. . . . . . : '{buffer_name}'");
    }
    s
}

/// Emit [`dump`] line by line on the `chatui.layout.dump` target.
pub fn log_dump(buffers: &BufferLayout, windows: &WindowLayout, current: Option<LayoutId>) {
    for line in dump(buffers, windows, current).lines() {
        tracing::info!(target: "chatui.layout.dump", "{line}");
    }
}
