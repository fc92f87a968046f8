#![forbid(unsafe_code)]

//! Owned layout state: both stores plus the focus id of the last window save.
//!
//! The application's top-level controller owns one [`LayoutState`] and
//! borrows its host into each call. Nothing here is global. Binding buffers
//! that appear later needs no stored state and goes through
//! [`crate::reconcile`] directly.

use crate::buffer_layout::{BufferApplyReport, BufferLayout};
use crate::config::SaveLayoutOnExit;
use crate::debug;
use crate::host::{BufferHost, WindowHost};
use crate::snapshot::{LAYOUT_SCHEMA_VERSION, LayoutSnapshot, LayoutSnapshotError};
use crate::window_layout::{LayoutId, WindowApplyReport, WindowLayout};

/// Buffer and window layouts saved from, and applied to, a host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutState {
    buffers: BufferLayout,
    windows: WindowLayout,
    current_window: Option<LayoutId>,
}

impl LayoutState {
    /// Empty state: nothing saved yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn buffers(&self) -> &BufferLayout {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut BufferLayout {
        &mut self.buffers
    }

    #[must_use]
    pub fn windows(&self) -> &WindowLayout {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowLayout {
        &mut self.windows
    }

    /// Leaf that had focus at the last window save.
    #[must_use]
    pub fn current_window(&self) -> Option<LayoutId> {
        self.current_window
    }

    pub fn save_buffers<H: BufferHost>(&mut self, host: &H) {
        self.buffers.save(host);
    }

    /// Save the split tree and remember which leaf had focus.
    pub fn save_windows<H: WindowHost>(&mut self, host: &H) -> Option<LayoutId> {
        self.current_window = self.windows.save(host);
        self.current_window
    }

    pub fn reset_buffers<H: BufferHost>(&mut self, host: &mut H) {
        self.buffers.reset(host);
    }

    pub fn reset_windows<H: WindowHost>(&mut self, host: &mut H) {
        self.windows.reset(host);
        self.current_window = None;
    }

    pub fn apply_buffers<H: BufferHost>(&self, host: &mut H) -> BufferApplyReport {
        self.buffers.apply(host)
    }

    /// Replay the saved tree, focusing the leaf saved as current.
    pub fn apply_windows<H: WindowHost>(&self, host: &mut H) -> WindowApplyReport {
        self.windows.apply(host, self.current_window)
    }

    /// Replay the saved tree, focusing the leaf `focused`.
    pub fn apply_windows_with_focus<H: WindowHost>(
        &self,
        host: &mut H,
        focused: Option<LayoutId>,
    ) -> WindowApplyReport {
        self.windows.apply(host, focused)
    }

    /// Save what `policy` asks for before shutdown.
    pub fn save_on_exit<H: WindowHost>(&mut self, host: &H, policy: SaveLayoutOnExit) {
        if policy.saves_buffers() {
            self.save_buffers(host);
        }
        if policy.saves_windows() {
            self.save_windows(host);
        }
        tracing::debug!(target: "chatui.layout", ?policy, "layout saved on exit");
    }

    /// Text dump of both stores.
    #[must_use]
    pub fn dump(&self) -> String {
        debug::dump(&self.buffers, &self.windows, self.current_window)
    }

    /// Emit [`Self::dump`] through tracing.
    pub fn dump_log(&self) {
        debug::log_dump(&self.buffers, &self.windows, self.current_window);
    }

    /// Persisted form of the current state.
    #[must_use]
    pub fn to_snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            schema_version: LAYOUT_SCHEMA_VERSION,
            buffers: self.buffers.entries().to_vec(),
            windows: self.windows.to_records(),
            current_window: self.current_window,
        }
    }

    /// Rebuild state from a snapshot.
    ///
    /// A current-window id that does not name a leaf is dropped.
    pub fn from_snapshot(snapshot: &LayoutSnapshot) -> Result<Self, LayoutSnapshotError> {
        snapshot.validate()?;
        let windows = WindowLayout::from_records(&snapshot.windows)?;

        let mut buffers = BufferLayout::new();
        for entry in &snapshot.buffers {
            buffers.add(entry.plugin_name(), entry.buffer_name(), entry.number());
        }

        let current_window = match snapshot.current_window {
            Some(id) if !windows.is_leaf_id(id) => {
                tracing::warn!(
                    target: "chatui.layout",
                    id = id.get(),
                    "saved current window is not a leaf, ignoring"
                );
                None
            }
            other => other,
        };

        Ok(Self {
            buffers,
            windows,
            current_window,
        })
    }
}
