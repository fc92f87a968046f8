#![forbid(unsafe_code)]

//! Buffer layout store: the number each `(plugin, buffer)` identity should
//! occupy, and the pass that renumbers live buffers to match.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::host::{BufferHost, BufferKey};

/// Returned by [`BufferLayout::lookup_number`] when no entry matches.
pub const NUMBER_NOT_FOUND: u32 = 0;

/// Desired number for one buffer identity.
///
/// Entries built in code always carry a number `>= 1`; a deserialized entry
/// is checked by [`crate::LayoutSnapshot::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferLayoutEntry {
    plugin_name: String,
    buffer_name: String,
    number: u32,
}

impl BufferLayoutEntry {
    /// Create an entry, rejecting number 0.
    #[must_use]
    pub fn new(
        plugin_name: impl Into<String>,
        buffer_name: impl Into<String>,
        number: u32,
    ) -> Option<Self> {
        (number != 0).then(|| Self {
            plugin_name: plugin_name.into(),
            buffer_name: buffer_name.into(),
            number,
        })
    }

    #[must_use]
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    #[must_use]
    pub fn buffer_name(&self) -> &str {
        &self.buffer_name
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Identity of the buffer this entry describes.
    #[must_use]
    pub fn key(&self) -> BufferKey {
        BufferKey::new(self.plugin_name.clone(), self.buffer_name.clone())
    }
}

/// Outcome of one [`BufferLayout::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferApplyReport {
    /// Renumber requests issued to the host.
    pub moves: usize,
    /// Full passes over the live list, including the final quiet one.
    pub passes: usize,
    /// Live buffers that had an entry in the store.
    pub matched: usize,
}

#[derive(Debug, Default)]
struct PassOutcome {
    moves: usize,
    changed: usize,
    matched: usize,
}

/// Ordered store of buffer layout entries, in live order at save time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferLayout {
    entries: Vec<BufferLayoutEntry>,
}

impl BufferLayout {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[BufferLayoutEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry. Returns `None` (nothing recorded) for number 0.
    pub fn add(
        &mut self,
        plugin_name: impl Into<String>,
        buffer_name: impl Into<String>,
        number: u32,
    ) -> Option<&BufferLayoutEntry> {
        let entry = BufferLayoutEntry::new(plugin_name, buffer_name, number)?;
        self.entries.push(entry);
        self.entries.last()
    }

    /// Remove the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<BufferLayoutEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rebuild the store from the live buffer list.
    pub fn save<H: BufferHost>(&mut self, host: &H) {
        self.entries.clear();
        for buffer in host.buffer_ids() {
            let Some(view) = host.buffer(buffer) else {
                continue;
            };
            if self
                .add(view.plugin_name, view.buffer_name, view.number)
                .is_none()
            {
                tracing::debug!(
                    target: "chatui.layout",
                    buffer = %view.key(),
                    "buffer without a number not recorded"
                );
            }
        }
        tracing::debug!(
            target: "chatui.layout",
            entries = self.entries.len(),
            "buffer layout saved"
        );
    }

    /// Number stored for an identity (case-insensitive), first match wins.
    ///
    /// Returns [`NUMBER_NOT_FOUND`] when nothing matches.
    #[must_use]
    pub fn lookup_number(&self, plugin_name: &str, buffer_name: &str) -> u32 {
        self.entries
            .iter()
            .find(|entry| {
                entry.plugin_name.eq_ignore_ascii_case(plugin_name)
                    && entry.buffer_name.eq_ignore_ascii_case(buffer_name)
            })
            .map_or(NUMBER_NOT_FOUND, |entry| entry.number)
    }

    /// Renumber live buffers to their stored numbers.
    ///
    /// Each pass repeatedly takes the first live buffer not yet visited in
    /// that pass, visits it and rescans from the start, since a renumber may
    /// reorder the live list. A move can displace a buffer visited earlier,
    /// so passes repeat until one changes no buffer's number or leaves the
    /// live order in a state an earlier pass already produced, bounded by the
    /// number of live buffers. The second stop covers identities that differ
    /// only by case: both map to the same entry and keep displacing each
    /// other. A move the host clamps does not count as a change.
    pub fn apply<H: BufferHost>(&self, host: &mut H) -> BufferApplyReport {
        let mut report = BufferApplyReport::default();
        if self.entries.is_empty() {
            return report;
        }

        let _span = tracing::debug_span!("layout.apply_buffers", entries = self.entries.len())
            .entered();

        let order = host.buffer_ids();
        let max_passes = order.len() + 1;
        let mut seen: HashSet<Vec<H::BufferId>> = HashSet::from([order]);
        loop {
            let pass = self.apply_pass(host);
            report.passes += 1;
            report.moves += pass.moves;
            if report.passes == 1 {
                report.matched = pass.matched;
            }
            if pass.changed == 0 {
                break;
            }
            if !seen.insert(host.buffer_ids()) {
                tracing::debug!(
                    target: "chatui.layout",
                    passes = report.passes,
                    "buffer order repeats, stopping"
                );
                break;
            }
            if report.passes >= max_passes {
                tracing::warn!(
                    target: "chatui.layout",
                    passes = report.passes,
                    "buffer numbers did not settle"
                );
                break;
            }
        }

        tracing::debug!(
            target: "chatui.layout",
            moves = report.moves,
            passes = report.passes,
            matched = report.matched,
            "buffer layout applied"
        );
        report
    }

    fn apply_pass<H: BufferHost>(&self, host: &mut H) -> PassOutcome {
        let mut visited: HashSet<H::BufferId> = HashSet::new();
        let mut pass = PassOutcome::default();

        while let Some(buffer) = host
            .buffer_ids()
            .into_iter()
            .find(|buffer| !visited.contains(buffer))
        {
            visited.insert(buffer);
            let Some((target, current)) = host.buffer(buffer).map(|view| {
                (
                    self.lookup_number(view.plugin_name, view.buffer_name),
                    view.number,
                )
            }) else {
                continue;
            };

            host.set_layout_number(buffer, target);
            if target == NUMBER_NOT_FOUND {
                continue;
            }
            pass.matched += 1;
            if target != current {
                tracing::trace!(
                    target: "chatui.layout",
                    ?buffer,
                    from = current,
                    to = target,
                    "renumber buffer"
                );
                host.move_buffer_to_number(buffer, target);
                pass.moves += 1;
                if host.buffer(buffer).map(|view| view.number) != Some(current) {
                    pass.changed += 1;
                }
            }
        }
        pass
    }

    /// Drop every entry and clear the layout number on all live buffers.
    pub fn reset<H: BufferHost>(&mut self, host: &mut H) {
        self.entries.clear();
        for buffer in host.buffer_ids() {
            host.set_layout_number(buffer, NUMBER_NOT_FOUND);
        }
    }
}
