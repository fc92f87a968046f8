#![forbid(unsafe_code)]

//! Contract between the layout engine and the application that owns the
//! live buffers and the live split tree.
//!
//! The engine never holds live objects. It reads identities through these
//! traits and issues requests (renumber, split, switch, bind) back through
//! them, so a snapshot stays meaningful across a restart where every live
//! handle is a different instance.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Identity of a buffer: owning plugin plus buffer name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferKey {
    pub plugin_name: String,
    pub buffer_name: String,
}

impl BufferKey {
    /// Build a key from plugin and buffer names.
    #[must_use]
    pub fn new(plugin_name: impl Into<String>, buffer_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            buffer_name: buffer_name.into(),
        }
    }

    /// Exact, case-sensitive comparison against a live identity.
    #[must_use]
    pub fn matches(&self, plugin_name: &str, buffer_name: &str) -> bool {
        self.plugin_name == plugin_name && self.buffer_name == buffer_name
    }

    /// ASCII case-insensitive comparison against a live identity.
    #[must_use]
    pub fn matches_ignore_case(&self, plugin_name: &str, buffer_name: &str) -> bool {
        self.plugin_name.eq_ignore_ascii_case(plugin_name)
            && self.buffer_name.eq_ignore_ascii_case(buffer_name)
    }
}

impl fmt::Display for BufferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.plugin_name, self.buffer_name)
    }
}

/// Borrowed view of one live buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView<'a> {
    pub plugin_name: &'a str,
    pub buffer_name: &'a str,
    pub number: u32,
}

impl BufferView<'_> {
    /// Owned identity of this buffer.
    #[must_use]
    pub fn key(&self) -> BufferKey {
        BufferKey::new(self.plugin_name, self.buffer_name)
    }
}

/// One node of the live split tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveTreeNode<W, N> {
    /// A region displaying a buffer.
    Leaf { window: W },
    /// A split producing two regions.
    Split {
        split_pct: u8,
        split_horizontal: bool,
        child1: Option<N>,
        child2: Option<N>,
    },
}

/// Live buffer list.
pub trait BufferHost {
    type BufferId: Copy + Eq + Hash + fmt::Debug;

    /// Buffers in live order.
    fn buffer_ids(&self) -> Vec<Self::BufferId>;

    /// Identity and number of a buffer, `None` if the handle is stale.
    fn buffer(&self, buffer: Self::BufferId) -> Option<BufferView<'_>>;

    /// Record the number the layout wants for this buffer (0 clears it).
    fn set_layout_number(&mut self, buffer: Self::BufferId, number: u32);

    /// Renumber a buffer. Other buffers may shift as a result.
    fn move_buffer_to_number(&mut self, buffer: Self::BufferId, number: u32);
}

/// Live split tree and windowing primitives.
pub trait WindowHost: BufferHost {
    type Window: Copy + Eq + Hash + fmt::Debug;
    type TreeNode: Copy + fmt::Debug;

    /// Root of the live split tree.
    fn tree_root(&self) -> Option<Self::TreeNode>;

    /// Inspect one live tree node.
    fn tree_node(&self, node: Self::TreeNode) -> Option<LiveTreeNode<Self::Window, Self::TreeNode>>;

    /// Window holding keyboard focus.
    fn current_window(&self) -> Option<Self::Window>;

    /// All live windows in live order.
    fn windows(&self) -> Vec<Self::Window>;

    /// Buffer displayed by a window.
    fn window_buffer(&self, window: Self::Window) -> Option<Self::BufferId>;

    /// Collapse every region into `window`, which then fills the screen.
    fn merge_all(&mut self, window: Self::Window);

    /// Split `window` horizontally, giving `split_pct` percent to the new
    /// region. The new region becomes current and is returned.
    fn split_horizontal(&mut self, window: Self::Window, split_pct: u8) -> Option<Self::Window>;

    /// Split `window` vertically. Same contract as [`Self::split_horizontal`].
    fn split_vertical(&mut self, window: Self::Window, split_pct: u8) -> Option<Self::Window>;

    /// Give focus to `window`.
    fn switch_to_window(&mut self, window: Self::Window);

    /// Display `buffer` in `window`.
    fn switch_to_buffer(&mut self, window: Self::Window, buffer: Self::BufferId);

    /// Pending binding recorded on a window by a layout apply.
    fn layout_target(&self, window: Self::Window) -> Option<&BufferKey>;

    /// Set or clear the pending binding of a window.
    fn set_layout_target(&mut self, window: Self::Window, target: Option<BufferKey>);
}
