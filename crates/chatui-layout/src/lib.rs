#![forbid(unsafe_code)]

//! Layout persistence for the chatui terminal chat client.
//!
//! Two independent stores capture the live arrangement:
//!
//! - [`BufferLayout`]: the number each `(plugin, buffer)` identity should
//!   occupy.
//! - [`WindowLayout`]: a mirror of the live split tree whose leaves name the
//!   buffer each region displayed.
//!
//! Saving walks the live state through the [`host`] traits. Applying collapses
//! the screen, replays the split tree, tags each region with the buffer it
//! should show, binds whatever matching buffers exist ([`reconcile`]) and gives
//! focus back to the region that had it. [`LayoutState`] bundles both stores
//! for an application controller; [`snapshot`] persists them.

pub mod buffer_layout;
pub mod config;
pub mod debug;
pub mod host;
pub mod reconcile;
pub mod snapshot;
pub mod state;
pub mod window_layout;

pub use buffer_layout::{BufferApplyReport, BufferLayout, BufferLayoutEntry, NUMBER_NOT_FOUND};
pub use config::{LayoutConfig, LayoutConfigError, SaveLayoutOnExit};
pub use host::{BufferHost, BufferKey, BufferView, LiveTreeNode, WindowHost};
pub use reconcile::{check_all_buffers, check_one_buffer};
pub use snapshot::{LAYOUT_SCHEMA_VERSION, LayoutSnapshot, LayoutSnapshotError, WindowLayoutRecord};
pub use state::LayoutState;
pub use window_layout::{
    LayoutId, LayoutTreeError, MAX_SPLIT_PCT, MIN_SPLIT_PCT, SplitLayout, WindowApplyReport,
    WindowLayout, WindowLayoutKind, WindowLayoutNode,
};
