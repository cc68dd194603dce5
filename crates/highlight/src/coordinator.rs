use crate::backend::{HighlightBackend, HighlightRole};
use crate::bucket::HighlightBucket;
use crate::error::{HighlightError, Result};
use serde::{Deserialize, Serialize};
use sidechat_document::{SelectionRange, TextLeaf};
use std::collections::HashMap;
use std::fmt;

/// Opaque key a panel holds instead of a reference into the buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Serializable view of bucket membership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSnapshot {
    pub selected: Vec<HandleId>,
    pub non_selected: Vec<HandleId>,
    pub context: Vec<(HandleId, Vec<SelectionRange>)>,
}

/// Owns the Selected / NonSelected / Context buckets.
///
/// Invariant: Selected holds at most one handle after every operation.
pub struct HighlightCoordinator<B: HighlightBackend> {
    backend: B,
    show_context: bool,
    handles: HashMap<HandleId, SelectionRange>,
    next_handle: u64,
    selected: HighlightBucket,
    non_selected: HighlightBucket,
    context: HighlightBucket,
}

impl<B: HighlightBackend> HighlightCoordinator<B> {
    /// Register every role with `backend`.
    ///
    /// Fails with [`HighlightError::CapabilityMissing`] when the host cannot highlight.
    pub fn new(mut backend: B, show_context: bool) -> Result<Self> {
        for role in HighlightRole::ALL {
            backend.register(role)?;
        }
        Ok(Self {
            backend,
            show_context,
            handles: HashMap::new(),
            next_handle: 0,
            selected: HighlightBucket::new(HighlightRole::Selected),
            non_selected: HighlightBucket::new(HighlightRole::NonSelected),
            context: HighlightBucket::new(HighlightRole::Context),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn show_context(&self) -> bool {
        self.show_context
    }

    /// Toggle context highlighting; disabling drops every context range
    pub fn set_show_context(&mut self, enabled: bool) {
        self.show_context = enabled;
        if !enabled && !self.context.is_empty() {
            let handles: Vec<_> = self.context.handles().collect();
            for handle in handles {
                self.context.remove(handle);
            }
            self.sync(HighlightRole::Context);
        }
    }

    /// Issue a handle wrapping `selection`. It joins no bucket until marked.
    pub fn create_handle(&mut self, selection: SelectionRange) -> HandleId {
        let handle = HandleId(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, selection);
        handle
    }

    pub fn selection(&self, handle: HandleId) -> Option<SelectionRange> {
        self.handles.get(&handle).copied()
    }

    fn require(&self, handle: HandleId) -> Result<SelectionRange> {
        self.selection(handle)
            .ok_or(HighlightError::UnknownHandle(handle))
    }

    /// Make `handle` the only Selected handle; the previous one moves to NonSelected
    pub fn mark_as_selected(&mut self, handle: HandleId) -> Result<()> {
        let selection = self.require(handle)?;

        let others: Vec<_> = self.selected.handles().filter(|h| *h != handle).collect();
        for other in others {
            self.selected.remove(other);
            if let Some(range) = self.selection(other) {
                self.non_selected.insert(other, vec![range]);
            }
        }
        self.non_selected.remove(handle);
        self.selected.insert(handle, vec![selection]);

        debug_assert!(self.selected.len() <= 1);
        self.sync(HighlightRole::Selected);
        self.sync(HighlightRole::NonSelected);
        Ok(())
    }

    pub fn mark_as_non_selected(&mut self, handle: HandleId) -> Result<()> {
        let selection = self.require(handle)?;
        let removed = self.selected.remove(handle);
        let added = self.non_selected.insert(handle, vec![selection]);
        if removed {
            self.sync(HighlightRole::Selected);
        }
        if added {
            self.sync(HighlightRole::NonSelected);
        }
        Ok(())
    }

    /// Replace `handle`'s context ranges with `leaves`, minus the handle's own selection.
    ///
    /// No-op while context highlighting is disabled.
    pub fn set_context_ranges(&mut self, handle: HandleId, leaves: &[TextLeaf]) -> Result<()> {
        let selection = self.require(handle)?;
        if !self.show_context {
            return Ok(());
        }

        let ranges: Vec<SelectionRange> = leaves
            .iter()
            .flat_map(|leaf| selection.outside_parts(leaf))
            .filter(|range| !range.is_collapsed())
            .collect();

        let changed = if ranges.is_empty() {
            self.context.remove(handle)
        } else {
            self.context.insert(handle, ranges)
        };
        if changed {
            self.sync(HighlightRole::Context);
        }
        Ok(())
    }

    /// Drop all of `handle`'s context ranges
    pub fn clear_context_highlights(&mut self, handle: HandleId) {
        if self.context.remove(handle) {
            self.sync(HighlightRole::Context);
        }
    }

    /// Release `handle` from every bucket. Safe to repeat and on unknown handles.
    pub fn remove_handle(&mut self, handle: HandleId) {
        if self.selected.remove(handle) {
            self.sync(HighlightRole::Selected);
        }
        if self.non_selected.remove(handle) {
            self.sync(HighlightRole::NonSelected);
        }
        if self.context.remove(handle) {
            self.sync(HighlightRole::Context);
        }
        if self.handles.remove(&handle).is_some() {
            log::debug!("Released {handle}");
        }
    }

    pub fn selected_handle(&self) -> Option<HandleId> {
        self.selected.handles().next()
    }

    pub fn is_selected(&self, handle: HandleId) -> bool {
        self.selected.contains(handle)
    }

    pub fn is_non_selected(&self, handle: HandleId) -> bool {
        self.non_selected.contains(handle)
    }

    pub fn has_context(&self, handle: HandleId) -> bool {
        self.context.contains(handle)
    }

    pub fn context_ranges(&self, handle: HandleId) -> &[SelectionRange] {
        self.context.ranges_of(handle)
    }

    pub fn bucket(&self, role: HighlightRole) -> &HighlightBucket {
        match role {
            HighlightRole::Selected => &self.selected,
            HighlightRole::NonSelected => &self.non_selected,
            HighlightRole::Context => &self.context,
        }
    }

    pub fn snapshot(&self) -> HighlightSnapshot {
        HighlightSnapshot {
            selected: self.selected.handles().collect(),
            non_selected: self.non_selected.handles().collect(),
            context: self
                .context
                .handles()
                .map(|h| (h, self.context.ranges_of(h).to_vec()))
                .collect(),
        }
    }

    fn sync(&mut self, role: HighlightRole) {
        let ranges = self.bucket(role).ranges();
        self.backend.sync(role, &ranges);
    }
}
