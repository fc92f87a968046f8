#![forbid(unsafe_code)]

//! Window layout tree: an owned mirror of the live split tree.
//!
//! Nodes live in an id-keyed arena. Split nodes reference their children by
//! [`LayoutId`] and every node records its parent id, so the tree can be
//! written to disk as a flat list and rebuilt without owning pointers.
//!
//! Ids are handed out in preorder by [`WindowLayout::save`], starting at 1.
//! They only have meaning within one save/apply round-trip: the id returned
//! by `save` names the leaf that had focus, and [`WindowLayout::apply`] uses
//! it to give focus back to the region rebuilt from that leaf.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::{BufferKey, LiveTreeNode, WindowHost};
use crate::reconcile;

/// Smallest split percentage a split node may carry.
pub const MIN_SPLIT_PCT: u8 = 1;
/// Largest split percentage a split node may carry.
pub const MAX_SPLIT_PCT: u8 = 99;

/// Identifier of a node within one window layout tree. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LayoutId(u32);

impl LayoutId {
    /// First id assigned by a save.
    pub const MIN: Self = Self(1);

    /// Create an id, rejecting 0.
    pub fn new(raw: u32) -> Result<Self, LayoutTreeError> {
        if raw == 0 {
            return Err(LayoutTreeError::ZeroId);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for LayoutId {
    type Error = LayoutTreeError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<LayoutId> for u32 {
    fn from(id: LayoutId) -> Self {
        id.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of a split node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLayout {
    /// Share given to the region created by the split, in `1..=99`.
    pub split_pct: u8,
    pub split_horizontal: bool,
    pub child1: Option<LayoutId>,
    pub child2: Option<LayoutId>,
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowLayoutKind {
    /// A screen region and the buffer it should display.
    Leaf(BufferKey),
    /// A split into two regions.
    Split(SplitLayout),
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowLayoutNode {
    pub id: LayoutId,
    pub parent: Option<LayoutId>,
    pub kind: WindowLayoutKind,
}

impl WindowLayoutNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, WindowLayoutKind::Leaf(_))
    }

    /// Split percentage, 0 for a leaf.
    #[must_use]
    pub fn split_pct(&self) -> u8 {
        match &self.kind {
            WindowLayoutKind::Leaf(_) => 0,
            WindowLayoutKind::Split(split) => split.split_pct,
        }
    }

    #[must_use]
    pub fn split_horizontal(&self) -> bool {
        match &self.kind {
            WindowLayoutKind::Leaf(_) => false,
            WindowLayoutKind::Split(split) => split.split_horizontal,
        }
    }

    /// Intended buffer, `None` for a split node.
    #[must_use]
    pub fn buffer(&self) -> Option<&BufferKey> {
        match &self.kind {
            WindowLayoutKind::Leaf(key) => Some(key),
            WindowLayoutKind::Split(_) => None,
        }
    }

    #[must_use]
    pub fn child1(&self) -> Option<LayoutId> {
        match &self.kind {
            WindowLayoutKind::Leaf(_) => None,
            WindowLayoutKind::Split(split) => split.child1,
        }
    }

    #[must_use]
    pub fn child2(&self) -> Option<LayoutId> {
        match &self.kind {
            WindowLayoutKind::Leaf(_) => None,
            WindowLayoutKind::Split(split) => split.child2,
        }
    }
}

/// Errors building or validating a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutTreeError {
    #[error("layout node id 0 is invalid")]
    ZeroId,
    #[error("duplicate layout node id {id}")]
    DuplicateId { id: LayoutId },
    #[error("layout node {id} references missing parent {parent}")]
    ParentNotFound { id: LayoutId, parent: LayoutId },
    #[error("layout node {id} cannot be attached under leaf {parent}")]
    ParentIsLeaf { id: LayoutId, parent: LayoutId },
    #[error("layout node {id} cannot be attached: split {parent} already has two children")]
    ParentFull { id: LayoutId, parent: LayoutId },
    #[error("layout node {id} has no parent but root {root} already exists")]
    RootExists { id: LayoutId, root: LayoutId },
    #[error("split node {id} has percentage {split_pct} (expected 1..=99)")]
    InvalidSplitPercent { id: LayoutId, split_pct: u8 },
    #[error("layout nodes present but none is a root")]
    MissingRoot,
    #[error("layout node {id} is not reachable from the root")]
    Unreachable { id: LayoutId },
}

/// Outcome of one [`WindowLayout::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowApplyReport {
    /// Splits the host performed.
    pub splits: usize,
    /// Splits the host refused.
    pub failed_splits: usize,
    /// Regions tagged with an intended buffer.
    pub leaves: usize,
    /// Regions bound to a live buffer by the reconciliation pass.
    pub bound: usize,
    /// Whether the saved focus id matched a replayed leaf.
    pub focus_matched: bool,
}

/// Owned window layout tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowLayout {
    root: Option<LayoutId>,
    nodes: BTreeMap<LayoutId, WindowLayoutNode>,
}

impl WindowLayout {
    /// Empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> Option<LayoutId> {
        self.root
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Direct lookup by id.
    #[must_use]
    pub fn node(&self, id: LayoutId) -> Option<&WindowLayoutNode> {
        self.nodes.get(&id)
    }

    /// Preorder search from the root.
    #[must_use]
    pub fn search_by_id(&self, id: LayoutId) -> Option<&WindowLayoutNode> {
        self.preorder().into_iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_leaf()).count()
    }

    #[must_use]
    pub fn split_count(&self) -> usize {
        self.nodes.values().filter(|node| !node.is_leaf()).count()
    }

    /// Nodes reachable from the root: a node before its children, child1
    /// before child2.
    #[must_use]
    pub fn preorder(&self) -> Vec<&WindowLayoutNode> {
        self.preorder_with_depth()
            .into_iter()
            .map(|(_, node)| node)
            .collect()
    }

    /// Like [`Self::preorder`], paired with each node's depth (root = 0).
    #[must_use]
    pub fn preorder_with_depth(&self) -> Vec<(usize, &WindowLayoutNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, LayoutId)> = self.root.map(|root| (0, root)).into_iter().collect();
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            out.push((depth, node));
            if let Some(child2) = node.child2() {
                stack.push((depth + 1, child2));
            }
            if let Some(child1) = node.child1() {
                stack.push((depth + 1, child1));
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
    }

    /// Attach a leaf under `parent` (as child1, else child2), or as root.
    pub fn add_leaf(
        &mut self,
        id: LayoutId,
        parent: Option<LayoutId>,
        buffer: BufferKey,
    ) -> Result<(), LayoutTreeError> {
        self.insert(id, parent, WindowLayoutKind::Leaf(buffer))
    }

    /// Attach a split node under `parent` (as child1, else child2), or as root.
    pub fn add_split(
        &mut self,
        id: LayoutId,
        parent: Option<LayoutId>,
        split_pct: u8,
        split_horizontal: bool,
    ) -> Result<(), LayoutTreeError> {
        if !(MIN_SPLIT_PCT..=MAX_SPLIT_PCT).contains(&split_pct) {
            return Err(LayoutTreeError::InvalidSplitPercent { id, split_pct });
        }
        self.insert(
            id,
            parent,
            WindowLayoutKind::Split(SplitLayout {
                split_pct,
                split_horizontal,
                child1: None,
                child2: None,
            }),
        )
    }

    fn insert(
        &mut self,
        id: LayoutId,
        parent: Option<LayoutId>,
        kind: WindowLayoutKind,
    ) -> Result<(), LayoutTreeError> {
        if self.nodes.contains_key(&id) {
            return Err(LayoutTreeError::DuplicateId { id });
        }
        match parent {
            None => {
                if let Some(root) = self.root {
                    return Err(LayoutTreeError::RootExists { id, root });
                }
                self.root = Some(id);
            }
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or(LayoutTreeError::ParentNotFound { id, parent: parent_id })?;
                let WindowLayoutKind::Split(split) = &mut parent_node.kind else {
                    return Err(LayoutTreeError::ParentIsLeaf { id, parent: parent_id });
                };
                if split.child1.is_none() {
                    split.child1 = Some(id);
                } else if split.child2.is_none() {
                    split.child2 = Some(id);
                } else {
                    return Err(LayoutTreeError::ParentFull { id, parent: parent_id });
                }
            }
        }
        self.nodes.insert(id, WindowLayoutNode { id, parent, kind });
        Ok(())
    }

    /// Rebuild the tree from the live split tree.
    ///
    /// Returns the id of the leaf whose window had focus, if any.
    pub fn save<H: WindowHost>(&mut self, host: &H) -> Option<LayoutId> {
        self.clear();
        let root = host.tree_root()?;
        let mut walk = SaveWalk {
            next_id: LayoutId::MIN.get(),
            current_window: host.current_window(),
            focused: None,
        };
        self.save_node(host, root, None, &mut walk);
        tracing::debug!(
            target: "chatui.layout",
            nodes = self.nodes.len(),
            leaves = self.leaf_count(),
            focused = ?walk.focused.map(LayoutId::get),
            "window layout saved"
        );
        walk.focused
    }

    fn save_node<H: WindowHost>(
        &mut self,
        host: &H,
        node: H::TreeNode,
        parent: Option<LayoutId>,
        walk: &mut SaveWalk<H::Window>,
    ) {
        let Some(live) = host.tree_node(node) else {
            return;
        };
        let Ok(id) = LayoutId::new(walk.next_id) else {
            return;
        };
        walk.next_id = walk.next_id.saturating_add(1);

        match live {
            LiveTreeNode::Leaf { window } => {
                if walk.current_window == Some(window) {
                    walk.focused = Some(id);
                }
                let buffer = host
                    .window_buffer(window)
                    .and_then(|buffer| host.buffer(buffer))
                    .map_or_else(|| BufferKey::new("", ""), |view| view.key());
                if let Err(err) = self.add_leaf(id, parent, buffer) {
                    tracing::warn!(target: "chatui.layout", %err, "window leaf not recorded");
                }
            }
            LiveTreeNode::Split {
                split_pct,
                split_horizontal,
                child1,
                child2,
            } => {
                let clamped = split_pct.clamp(MIN_SPLIT_PCT, MAX_SPLIT_PCT);
                if clamped != split_pct {
                    tracing::warn!(
                        target: "chatui.layout",
                        split_pct,
                        clamped,
                        "live split percentage out of range"
                    );
                }
                if let Err(err) = self.add_split(id, parent, clamped, split_horizontal) {
                    tracing::warn!(target: "chatui.layout", %err, "window split not recorded");
                    return;
                }
                if let Some(child1) = child1 {
                    self.save_node(host, child1, Some(id), walk);
                }
                if let Some(child2) = child2 {
                    self.save_node(host, child2, Some(id), walk);
                }
            }
        }
    }

    /// Resplit the screen according to the tree, bind buffers and restore
    /// focus to the region rebuilt from leaf `focused`.
    ///
    /// Does nothing on an empty tree.
    pub fn apply<H: WindowHost>(&self, host: &mut H, focused: Option<LayoutId>) -> WindowApplyReport {
        let mut report = WindowApplyReport::default();
        let Some(root) = self.root else {
            return report;
        };
        let Some(window) = host.current_window() else {
            tracing::warn!(target: "chatui.layout", "no current window, layout not applied");
            return report;
        };

        let _span =
            tracing::debug_span!("layout.apply_windows", nodes = self.nodes.len()).entered();

        host.merge_all(window);
        let old_window = host.current_window().unwrap_or(window);

        let mut replay = Replay {
            focused,
            matched: None,
            report: &mut report,
        };
        self.apply_node(host, root, &mut replay);
        let matched = replay.matched;

        report.bound = reconcile::check_all_buffers(host);
        report.focus_matched = matched.is_some();
        host.switch_to_window(matched.unwrap_or(old_window));

        tracing::debug!(
            target: "chatui.layout",
            splits = report.splits,
            failed_splits = report.failed_splits,
            leaves = report.leaves,
            bound = report.bound,
            focus_matched = report.focus_matched,
            "window layout applied"
        );
        report
    }

    fn apply_node<H: WindowHost>(&self, host: &mut H, id: LayoutId, replay: &mut Replay<'_, H::Window>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(window) = host.current_window() else {
            return;
        };

        match &node.kind {
            WindowLayoutKind::Split(split) => {
                tracing::trace!(
                    target: "chatui.layout",
                    id = id.get(),
                    split_pct = split.split_pct,
                    split_horizontal = split.split_horizontal,
                    "replay split"
                );
                let created = if split.split_horizontal {
                    host.split_horizontal(window, split.split_pct)
                } else {
                    host.split_vertical(window, split.split_pct)
                };
                if created.is_some() {
                    replay.report.splits += 1;
                } else {
                    replay.report.failed_splits += 1;
                    tracing::warn!(
                        target: "chatui.layout",
                        id = id.get(),
                        split_pct = split.split_pct,
                        "split refused by host"
                    );
                }

                if let Some(child2) = split.child2 {
                    self.apply_node(host, child2, replay);
                }
                if host.current_window() != Some(window) {
                    host.switch_to_window(window);
                }
                if let Some(child1) = split.child1 {
                    self.apply_node(host, child1, replay);
                }
            }
            WindowLayoutKind::Leaf(buffer) => {
                tracing::trace!(target: "chatui.layout", id = id.get(), %buffer, "replay leaf");
                if replay.focused == Some(id) {
                    replay.matched = Some(window);
                }
                host.set_layout_target(window, Some(buffer.clone()));
                replay.report.leaves += 1;
            }
        }
    }

    /// Drop the tree and clear pending bindings on every live window.
    pub fn reset<H: WindowHost>(&mut self, host: &mut H) {
        self.clear();
        for window in host.windows() {
            host.set_layout_target(window, None);
        }
    }
}

struct SaveWalk<W> {
    next_id: u32,
    current_window: Option<W>,
    focused: Option<LayoutId>,
}

struct Replay<'a, W> {
    focused: Option<LayoutId>,
    matched: Option<W>,
    report: &'a mut WindowApplyReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> LayoutId {
        LayoutId::new(raw).expect("test id must be non-zero")
    }

    /// root: horizontal 50 -> (core/status, vertical 30 -> (irc/#a, irc/#b))
    fn sample() -> WindowLayout {
        let mut tree = WindowLayout::new();
        tree.add_split(id(1), None, 50, true).unwrap();
        tree.add_leaf(id(2), Some(id(1)), BufferKey::new("core", "status"))
            .unwrap();
        tree.add_split(id(3), Some(id(1)), 30, false).unwrap();
        tree.add_leaf(id(4), Some(id(3)), BufferKey::new("irc", "#a"))
            .unwrap();
        tree.add_leaf(id(5), Some(id(3)), BufferKey::new("irc", "#b"))
            .unwrap();
        tree
    }

    #[test]
    fn zero_id_is_rejected() {
        assert_eq!(LayoutId::new(0), Err(LayoutTreeError::ZeroId));
    }

    #[test]
    fn children_fill_child1_then_child2() {
        let tree = sample();
        let root = tree.node(id(1)).unwrap();
        assert_eq!(root.child1(), Some(id(2)));
        assert_eq!(root.child2(), Some(id(3)));
        assert_eq!(tree.node(id(4)).unwrap().parent, Some(id(3)));
    }

    #[test]
    fn preorder_visits_parent_before_children() {
        let tree = sample();
        let ids: Vec<u32> = tree.preorder().iter().map(|node| node.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let depths: Vec<usize> = tree
            .preorder_with_depth()
            .iter()
            .map(|(depth, _)| *depth)
            .collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 2]);
    }

    #[test]
    fn counts_leaves_and_splits() {
        let tree = sample();
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.split_count(), 2);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn search_finds_nested_leaf() {
        let tree = sample();
        let node = tree.search_by_id(id(5)).expect("leaf 5 exists");
        assert_eq!(node.buffer(), Some(&BufferKey::new("irc", "#b")));
        assert_eq!(node.split_pct(), 0);
        assert!(tree.search_by_id(id(9)).is_none());
    }

    #[test]
    fn split_accessors_report_payload() {
        let tree = sample();
        let node = tree.node(id(3)).unwrap();
        assert_eq!(node.split_pct(), 30);
        assert!(!node.split_horizontal());
        assert!(node.buffer().is_none());
    }

    #[test]
    fn third_child_is_rejected() {
        let mut tree = sample();
        let err = tree
            .add_leaf(id(6), Some(id(3)), BufferKey::new("irc", "#c"))
            .unwrap_err();
        assert_eq!(err, LayoutTreeError::ParentFull { id: id(6), parent: id(3) });
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn child_of_leaf_is_rejected() {
        let mut tree = sample();
        let err = tree.add_split(id(6), Some(id(2)), 50, true).unwrap_err();
        assert_eq!(err, LayoutTreeError::ParentIsLeaf { id: id(6), parent: id(2) });
    }

    #[test]
    fn second_root_and_duplicates_are_rejected() {
        let mut tree = sample();
        assert_eq!(
            tree.add_leaf(id(7), None, BufferKey::new("a", "b")),
            Err(LayoutTreeError::RootExists { id: id(7), root: id(1) })
        );
        assert_eq!(
            tree.add_leaf(id(4), Some(id(3)), BufferKey::new("a", "b")),
            Err(LayoutTreeError::DuplicateId { id: id(4) })
        );
        assert_eq!(
            tree.add_leaf(id(8), Some(id(42)), BufferKey::new("a", "b")),
            Err(LayoutTreeError::ParentNotFound { id: id(8), parent: id(42) })
        );
    }

    #[test]
    fn split_percent_bounds_are_enforced() {
        let mut tree = WindowLayout::new();
        assert_eq!(
            tree.add_split(id(1), None, 0, true),
            Err(LayoutTreeError::InvalidSplitPercent { id: id(1), split_pct: 0 })
        );
        assert_eq!(
            tree.add_split(id(1), None, 100, false),
            Err(LayoutTreeError::InvalidSplitPercent { id: id(1), split_pct: 100 })
        );
        assert!(tree.add_split(id(1), None, 99, false).is_ok());
    }

    #[test]
    fn clear_empties_tree() {
        let mut tree = sample();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.preorder().is_empty());
    }

    #[test]
    fn layout_id_serializes_as_number_and_rejects_zero() {
        assert_eq!(serde_json::to_string(&id(7)).unwrap(), "7");
        assert_eq!(serde_json::from_str::<LayoutId>("3").unwrap(), id(3));
        assert!(serde_json::from_str::<LayoutId>("0").is_err());
    }
}
