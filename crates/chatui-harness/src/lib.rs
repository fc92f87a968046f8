#![forbid(unsafe_code)]

//! In-memory host for exercising layout save/apply without a terminal.
//!
//! [`MemoryHost`] keeps a numbered buffer list and a binary split tree of
//! windows, implements [`BufferHost`] and [`WindowHost`], and journals every
//! request the layout engine makes so tests can assert on them.
//!
//! Behaviour mirrors a typical terminal chat client:
//!
//! - Buffer numbers are list positions; moving a buffer reinserts it at the
//!   target slot and shifts the others.
//! - Splitting a window turns its leaf into a split node whose `child1` is
//!   the old window and `child2` a new window showing the same buffer. The
//!   new window becomes current.
//! - Merging keeps one window and drops all others.

pub mod fixtures;

use chatui_layout::{BufferHost, BufferKey, BufferView, LiveTreeNode, WindowHost};

pub type BufferId = u32;
pub type WindowId = u32;

/// Index of a node in the live split tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIndex(usize);

/// One request received from the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    MoveBuffer {
        buffer: BufferId,
        number: u32,
    },
    MergeAll {
        window: WindowId,
    },
    Split {
        window: WindowId,
        split_pct: u8,
        horizontal: bool,
        created: Option<WindowId>,
    },
    SwitchWindow {
        window: WindowId,
    },
    SwitchBuffer {
        window: WindowId,
        buffer: BufferId,
    },
}

/// Structural view of the live split tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Leaf {
        /// Buffer displayed.
        buffer: Option<BufferKey>,
        /// Pending layout target.
        target: Option<BufferKey>,
    },
    Split {
        split_pct: u8,
        horizontal: bool,
        first: Box<Shape>,
        second: Box<Shape>,
    },
}

impl Shape {
    /// Same tree with buffers and targets erased.
    #[must_use]
    pub fn skeleton(&self) -> Skeleton {
        match self {
            Self::Leaf { .. } => Skeleton::Leaf,
            Self::Split {
                split_pct,
                horizontal,
                first,
                second,
            } => Skeleton::Split(
                *split_pct,
                *horizontal,
                Box::new(first.skeleton()),
                Box::new(second.skeleton()),
            ),
        }
    }

    /// Pending targets of the leaves, left to right.
    #[must_use]
    pub fn leaf_targets(&self) -> Vec<Option<BufferKey>> {
        let mut out = Vec::new();
        self.collect_targets(&mut out);
        out
    }

    fn collect_targets(&self, out: &mut Vec<Option<BufferKey>>) {
        match self {
            Self::Leaf { target, .. } => out.push(target.clone()),
            Self::Split { first, second, .. } => {
                first.collect_targets(out);
                second.collect_targets(out);
            }
        }
    }

    /// Displayed buffers of the leaves, left to right.
    #[must_use]
    pub fn leaf_buffers(&self) -> Vec<Option<BufferKey>> {
        let mut out = Vec::new();
        self.collect_buffers(&mut out);
        out
    }

    fn collect_buffers(&self, out: &mut Vec<Option<BufferKey>>) {
        match self {
            Self::Leaf { buffer, .. } => out.push(buffer.clone()),
            Self::Split { first, second, .. } => {
                first.collect_buffers(out);
                second.collect_buffers(out);
            }
        }
    }
}

/// Split structure without leaf content: `(split_pct, horizontal, first, second)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skeleton {
    Leaf,
    Split(u8, bool, Box<Skeleton>, Box<Skeleton>),
}

#[derive(Debug, Clone)]
struct MemBuffer {
    id: BufferId,
    plugin_name: String,
    buffer_name: String,
    layout_number: u32,
}

#[derive(Debug, Clone)]
struct MemWindow {
    id: WindowId,
    buffer: Option<BufferId>,
    layout_target: Option<BufferKey>,
}

#[derive(Debug, Clone, Copy)]
enum MemNode {
    Leaf(WindowId),
    Split {
        split_pct: u8,
        horizontal: bool,
        child1: usize,
        child2: usize,
    },
}

/// Buffers, windows and split tree held in memory.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    buffers: Vec<MemBuffer>,
    windows: Vec<MemWindow>,
    nodes: Vec<MemNode>,
    root: usize,
    current: WindowId,
    next_buffer: BufferId,
    next_window: WindowId,
    max_windows: Option<usize>,
    ops: Vec<HostOp>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// One `core/weechat` buffer shown in one full-screen window.
    #[must_use]
    pub fn new() -> Self {
        let mut host = Self {
            buffers: Vec::new(),
            windows: Vec::new(),
            nodes: Vec::new(),
            root: 0,
            current: 1,
            next_buffer: 1,
            next_window: 1,
            max_windows: None,
            ops: Vec::new(),
        };
        let core = host.add_buffer("core", "weechat");
        let window = host.alloc_window(Some(core));
        host.nodes.push(MemNode::Leaf(window));
        host.current = window;
        host
    }

    /// Append a buffer at the end of the list.
    pub fn add_buffer(&mut self, plugin_name: &str, buffer_name: &str) -> BufferId {
        let id = self.next_buffer;
        self.next_buffer += 1;
        self.buffers.push(MemBuffer {
            id,
            plugin_name: plugin_name.to_string(),
            buffer_name: buffer_name.to_string(),
            layout_number: 0,
        });
        id
    }

    /// Refuse splits once this many windows exist.
    pub fn set_max_windows(&mut self, max_windows: Option<usize>) {
        self.max_windows = max_windows;
    }

    #[must_use]
    pub fn find_buffer(&self, plugin_name: &str, buffer_name: &str) -> Option<BufferId> {
        self.buffers
            .iter()
            .find(|b| b.plugin_name == plugin_name && b.buffer_name == buffer_name)
            .map(|b| b.id)
    }

    /// Buffer names in number order.
    #[must_use]
    pub fn buffer_names(&self) -> Vec<&str> {
        self.buffers.iter().map(|b| b.buffer_name.as_str()).collect()
    }

    #[must_use]
    pub fn buffer_number(&self, buffer: BufferId) -> Option<u32> {
        self.buffers
            .iter()
            .position(|b| b.id == buffer)
            .map(|index| index as u32 + 1)
    }

    #[must_use]
    pub fn layout_number(&self, buffer: BufferId) -> Option<u32> {
        self.buffers
            .iter()
            .find(|b| b.id == buffer)
            .map(|b| b.layout_number)
    }

    /// Reorder buffers to the given names (unknown names ignored).
    pub fn reorder_buffers(&mut self, names: &[&str]) {
        let mut reordered = Vec::with_capacity(self.buffers.len());
        for name in names {
            if let Some(index) = self.buffers.iter().position(|b| b.buffer_name == *name) {
                reordered.push(self.buffers.remove(index));
            }
        }
        reordered.append(&mut self.buffers);
        self.buffers = reordered;
    }

    #[must_use]
    pub fn current(&self) -> WindowId {
        self.current
    }

    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Identity of the buffer a window displays.
    #[must_use]
    pub fn window_buffer_key(&self, window: WindowId) -> Option<BufferKey> {
        let buffer = self.window(window)?.buffer?;
        self.buffer(buffer).map(|view| view.key())
    }

    /// Window currently displaying the given identity, first in live order.
    #[must_use]
    pub fn window_showing(&self, plugin_name: &str, buffer_name: &str) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|w| {
                w.buffer
                    .and_then(|buffer| self.buffer(buffer))
                    .is_some_and(|view| {
                        view.plugin_name == plugin_name && view.buffer_name == buffer_name
                    })
            })
            .map(|w| w.id)
    }

    /// Requests received so far.
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Number of buffer renumber requests received.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, HostOp::MoveBuffer { .. }))
            .count()
    }

    /// Structural view of the live tree.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape_of(self.root)
    }

    fn shape_of(&self, index: usize) -> Shape {
        match self.nodes[index] {
            MemNode::Leaf(window) => Shape::Leaf {
                buffer: self.window_buffer_key(window),
                target: self.window(window).and_then(|w| w.layout_target.clone()),
            },
            MemNode::Split {
                split_pct,
                horizontal,
                child1,
                child2,
            } => Shape::Split {
                split_pct,
                horizontal,
                first: Box::new(self.shape_of(child1)),
                second: Box::new(self.shape_of(child2)),
            },
        }
    }

    fn alloc_window(&mut self, buffer: Option<BufferId>) -> WindowId {
        let id = self.next_window;
        self.next_window += 1;
        self.windows.push(MemWindow {
            id,
            buffer,
            layout_target: None,
        });
        id
    }

    fn window(&self, window: WindowId) -> Option<&MemWindow> {
        self.windows.iter().find(|w| w.id == window)
    }

    fn window_mut(&mut self, window: WindowId) -> Option<&mut MemWindow> {
        self.windows.iter_mut().find(|w| w.id == window)
    }

    fn leaf_index(&self, window: WindowId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| matches!(node, MemNode::Leaf(w) if *w == window))
    }

    fn split(&mut self, window: WindowId, split_pct: u8, horizontal: bool) -> Option<WindowId> {
        let created = self.try_split(window, split_pct, horizontal);
        tracing::trace!(
            target: "chatui.harness",
            window,
            split_pct,
            horizontal,
            ?created,
            "split"
        );
        self.ops.push(HostOp::Split {
            window,
            split_pct,
            horizontal,
            created,
        });
        created
    }

    fn try_split(&mut self, window: WindowId, split_pct: u8, horizontal: bool) -> Option<WindowId> {
        if !(1..=99).contains(&split_pct) {
            return None;
        }
        if self
            .max_windows
            .is_some_and(|max| self.windows.len() >= max)
        {
            return None;
        }
        let index = self.leaf_index(window)?;
        let buffer = self.window(window)?.buffer;

        let created = self.alloc_window(buffer);
        let child1 = self.nodes.len();
        self.nodes.push(MemNode::Leaf(window));
        let child2 = self.nodes.len();
        self.nodes.push(MemNode::Leaf(created));
        self.nodes[index] = MemNode::Split {
            split_pct,
            horizontal,
            child1,
            child2,
        };
        self.current = created;
        Some(created)
    }
}

impl BufferHost for MemoryHost {
    type BufferId = BufferId;

    fn buffer_ids(&self) -> Vec<BufferId> {
        self.buffers.iter().map(|b| b.id).collect()
    }

    fn buffer(&self, buffer: BufferId) -> Option<BufferView<'_>> {
        let index = self.buffers.iter().position(|b| b.id == buffer)?;
        let b = &self.buffers[index];
        Some(BufferView {
            plugin_name: &b.plugin_name,
            buffer_name: &b.buffer_name,
            number: index as u32 + 1,
        })
    }

    fn set_layout_number(&mut self, buffer: BufferId, number: u32) {
        if let Some(b) = self.buffers.iter_mut().find(|b| b.id == buffer) {
            b.layout_number = number;
        }
    }

    fn move_buffer_to_number(&mut self, buffer: BufferId, number: u32) {
        self.ops.push(HostOp::MoveBuffer { buffer, number });
        let Some(index) = self.buffers.iter().position(|b| b.id == buffer) else {
            return;
        };
        let moved = self.buffers.remove(index);
        let slot = (number as usize).clamp(1, self.buffers.len() + 1) - 1;
        self.buffers.insert(slot, moved);
    }
}

impl WindowHost for MemoryHost {
    type Window = WindowId;
    type TreeNode = NodeIndex;

    fn tree_root(&self) -> Option<NodeIndex> {
        (!self.nodes.is_empty()).then_some(NodeIndex(self.root))
    }

    fn tree_node(&self, node: NodeIndex) -> Option<LiveTreeNode<WindowId, NodeIndex>> {
        Some(match *self.nodes.get(node.0)? {
            MemNode::Leaf(window) => LiveTreeNode::Leaf { window },
            MemNode::Split {
                split_pct,
                horizontal,
                child1,
                child2,
            } => LiveTreeNode::Split {
                split_pct,
                split_horizontal: horizontal,
                child1: Some(NodeIndex(child1)),
                child2: Some(NodeIndex(child2)),
            },
        })
    }

    fn current_window(&self) -> Option<WindowId> {
        Some(self.current)
    }

    fn windows(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id).collect()
    }

    fn window_buffer(&self, window: WindowId) -> Option<BufferId> {
        self.window(window)?.buffer
    }

    fn merge_all(&mut self, window: WindowId) {
        self.ops.push(HostOp::MergeAll { window });
        if self.window(window).is_none() {
            return;
        }
        self.windows.retain(|w| w.id == window);
        self.nodes = vec![MemNode::Leaf(window)];
        self.root = 0;
        self.current = window;
    }

    fn split_horizontal(&mut self, window: WindowId, split_pct: u8) -> Option<WindowId> {
        self.split(window, split_pct, true)
    }

    fn split_vertical(&mut self, window: WindowId, split_pct: u8) -> Option<WindowId> {
        self.split(window, split_pct, false)
    }

    fn switch_to_window(&mut self, window: WindowId) {
        self.ops.push(HostOp::SwitchWindow { window });
        if self.window(window).is_some() {
            self.current = window;
        }
    }

    fn switch_to_buffer(&mut self, window: WindowId, buffer: BufferId) {
        self.ops.push(HostOp::SwitchBuffer { window, buffer });
        if let Some(w) = self.window_mut(window) {
            w.buffer = Some(buffer);
        }
    }

    fn layout_target(&self, window: WindowId) -> Option<&BufferKey> {
        self.window(window)?.layout_target.as_ref()
    }

    fn set_layout_target(&mut self, window: WindowId, target: Option<BufferKey>) {
        if let Some(w) = self.window_mut(window) {
            w.layout_target = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_host_has_one_window_and_buffer() {
        let host = MemoryHost::new();
        assert_eq!(host.window_count(), 1);
        assert_eq!(host.buffer_names(), vec!["weechat"]);
        assert_eq!(
            host.window_buffer_key(host.current()),
            Some(BufferKey::new("core", "weechat"))
        );
    }

    #[test]
    fn split_makes_new_window_current_as_child2() {
        let mut host = MemoryHost::new();
        let first = host.current();
        let created = host.split_vertical(first, 40).expect("split succeeds");
        assert_eq!(host.current(), created);
        assert_eq!(
            host.shape().skeleton(),
            Skeleton::Split(40, false, Box::new(Skeleton::Leaf), Box::new(Skeleton::Leaf))
        );
        assert_eq!(host.window_buffer(created), host.window_buffer(first));
    }

    #[test]
    fn split_refused_for_bad_percent_or_window_limit() {
        let mut host = MemoryHost::new();
        let first = host.current();
        assert!(host.split_horizontal(first, 0).is_none());
        host.set_max_windows(Some(1));
        assert!(host.split_horizontal(first, 50).is_none());
        assert_eq!(host.window_count(), 1);
        assert_eq!(host.current(), first);
    }

    #[test]
    fn merge_all_keeps_one_window() {
        let mut host = MemoryHost::new();
        let first = host.current();
        let second = host.split_horizontal(first, 50).unwrap();
        host.split_vertical(second, 50).unwrap();
        host.merge_all(second);
        assert_eq!(host.windows(), vec![second]);
        assert_eq!(host.shape().skeleton(), Skeleton::Leaf);
        assert_eq!(host.current(), second);
    }

    #[test]
    fn move_reinserts_and_shifts() {
        let mut host = MemoryHost::new();
        let a = host.add_buffer("irc", "#a");
        host.add_buffer("irc", "#b");
        host.move_buffer_to_number(a, 3);
        assert_eq!(host.buffer_names(), vec!["weechat", "#b", "#a"]);
        assert_eq!(host.buffer_number(a), Some(3));
        assert_eq!(host.move_count(), 1);
    }

    proptest::proptest! {
        #[test]
        fn move_lands_on_clamped_number(count in 1usize..12, pick in 0usize..12, number in 0u32..20) {
            let mut host = MemoryHost::new();
            for i in 1..count {
                host.add_buffer("irc", &format!("#{i}"));
            }
            let ids = host.buffer_ids();
            let buffer = ids[pick % ids.len()];
            host.move_buffer_to_number(buffer, number);

            let expected = number.clamp(1, count as u32);
            proptest::prop_assert_eq!(host.buffer_number(buffer), Some(expected));
            let mut after = host.buffer_ids();
            after.sort_unstable();
            proptest::prop_assert_eq!(after, ids);
        }
    }

    #[test]
    fn reorder_puts_named_buffers_first() {
        let mut host = MemoryHost::new();
        host.add_buffer("irc", "#a");
        host.add_buffer("irc", "#b");
        host.reorder_buffers(&["#b", "#a"]);
        assert_eq!(host.buffer_names(), vec!["#b", "#a", "weechat"]);
    }
}
