#![forbid(unsafe_code)]

//! Persisted layout schema.
//!
//! A [`LayoutSnapshot`] is a flat, serde-friendly form of both stores. The
//! window tree is written as one record per node carrying its own id and its
//! parent id; among siblings, record order decides which child is `child1`.
//!
//! ```
//! use chatui_layout::snapshot::{LayoutSnapshot, WindowLayoutRecord};
//!
//! let json = r##"{
//!     "schema_version": 1,
//!     "buffers": [{ "plugin_name": "irc", "buffer_name": "#rust", "number": 2 }],
//!     "windows": [{ "id": 1, "plugin_name": "irc", "buffer_name": "#rust" }],
//!     "current_window": 1
//! }"##;
//! let snapshot = LayoutSnapshot::from_json_str(json).unwrap();
//! assert_eq!(snapshot.windows.len(), 1);
//! assert!(snapshot.validate().is_ok());
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buffer_layout::BufferLayoutEntry;
use crate::host::BufferKey;
use crate::window_layout::{LayoutId, LayoutTreeError, WindowLayout, WindowLayoutKind};

/// Current layout schema version.
pub const LAYOUT_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    LAYOUT_SCHEMA_VERSION
}

/// One persisted window tree node.
///
/// `split_pct == 0` marks a leaf; split nodes carry empty names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLayoutRecord {
    pub id: LayoutId,
    #[serde(default)]
    pub parent: Option<LayoutId>,
    #[serde(default)]
    pub split_pct: u8,
    #[serde(default)]
    pub split_horiz: bool,
    #[serde(default)]
    pub plugin_name: String,
    #[serde(default)]
    pub buffer_name: String,
}

/// Persisted form of both layout stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    #[serde(default)]
    pub buffers: Vec<BufferLayoutEntry>,
    #[serde(default)]
    pub windows: Vec<WindowLayoutRecord>,
    /// Leaf that had focus when the windows were saved.
    #[serde(default)]
    pub current_window: Option<LayoutId>,
}

/// Errors reading, writing or validating a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LayoutSnapshotError {
    #[error("unsupported layout schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("buffer layout entry {index} has number 0")]
    ZeroBufferNumber { index: usize },
    #[error("invalid window layout: {0}")]
    Tree(#[from] LayoutTreeError),
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutSnapshot {
    /// Check version, buffer numbers and window tree structure.
    pub fn validate(&self) -> Result<(), LayoutSnapshotError> {
        if self.schema_version != LAYOUT_SCHEMA_VERSION {
            return Err(LayoutSnapshotError::UnsupportedVersion {
                found: self.schema_version,
                expected: LAYOUT_SCHEMA_VERSION,
            });
        }
        if let Some(index) = self.buffers.iter().position(|entry| entry.number() == 0) {
            return Err(LayoutSnapshotError::ZeroBufferNumber { index });
        }
        WindowLayout::from_records(&self.windows)?;
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self, LayoutSnapshotError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, LayoutSnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, LayoutSnapshotError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), LayoutSnapshotError> {
        let json = self.to_json_string()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

impl WindowLayout {
    /// Flatten the tree into records, in preorder.
    #[must_use]
    pub fn to_records(&self) -> Vec<WindowLayoutRecord> {
        self.preorder()
            .into_iter()
            .map(|node| {
                let (plugin_name, buffer_name) = node
                    .buffer()
                    .map(|key| (key.plugin_name.clone(), key.buffer_name.clone()))
                    .unwrap_or_default();
                WindowLayoutRecord {
                    id: node.id,
                    parent: node.parent,
                    split_pct: node.split_pct(),
                    split_horiz: node.split_horizontal(),
                    plugin_name,
                    buffer_name,
                }
            })
            .collect()
    }

    /// Rebuild a tree from records in any order.
    ///
    /// Parents are attached before their children; siblings keep record
    /// order.
    pub fn from_records(records: &[WindowLayoutRecord]) -> Result<Self, LayoutTreeError> {
        let mut ids = BTreeSet::new();
        for record in records {
            if !ids.insert(record.id) {
                return Err(LayoutTreeError::DuplicateId { id: record.id });
            }
        }

        let mut root: Option<&WindowLayoutRecord> = None;
        let mut children: BTreeMap<LayoutId, Vec<&WindowLayoutRecord>> = BTreeMap::new();
        for record in records {
            match record.parent {
                None => {
                    if let Some(first) = root {
                        return Err(LayoutTreeError::RootExists {
                            id: record.id,
                            root: first.id,
                        });
                    }
                    root = Some(record);
                }
                Some(parent) => {
                    if !ids.contains(&parent) {
                        return Err(LayoutTreeError::ParentNotFound {
                            id: record.id,
                            parent,
                        });
                    }
                    children.entry(parent).or_default().push(record);
                }
            }
        }

        let mut tree = WindowLayout::new();
        let Some(root) = root else {
            if records.is_empty() {
                return Ok(tree);
            }
            return Err(LayoutTreeError::MissingRoot);
        };

        let mut queue = VecDeque::from([root]);
        while let Some(record) = queue.pop_front() {
            if record.split_pct == 0 {
                tree.add_leaf(
                    record.id,
                    record.parent,
                    BufferKey::new(record.plugin_name.clone(), record.buffer_name.clone()),
                )?;
            } else {
                tree.add_split(record.id, record.parent, record.split_pct, record.split_horiz)?;
            }
            if let Some(kids) = children.get(&record.id) {
                queue.extend(kids.iter().copied());
            }
        }

        if let Some(orphan) = records.iter().find(|record| tree.node(record.id).is_none()) {
            return Err(LayoutTreeError::Unreachable { id: orphan.id });
        }
        Ok(tree)
    }

    /// Whether `id` names a leaf of this tree.
    #[must_use]
    pub fn is_leaf_id(&self, id: LayoutId) -> bool {
        self.node(id)
            .is_some_and(|node| matches!(node.kind, WindowLayoutKind::Leaf(_)))
    }
}
