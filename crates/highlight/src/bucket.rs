use crate::backend::HighlightRole;
use crate::coordinator::HandleId;
use sidechat_document::SelectionRange;
use std::collections::BTreeMap;

/// Set of handles sharing one highlight role.
///
/// Insertion and removal are idempotent. Each member carries the ranges it paints.
#[derive(Debug, Clone)]
pub struct HighlightBucket {
    role: HighlightRole,
    members: BTreeMap<HandleId, Vec<SelectionRange>>,
}

impl HighlightBucket {
    #[must_use]
    pub fn new(role: HighlightRole) -> Self {
        Self {
            role,
            members: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> HighlightRole {
        self.role
    }

    /// Insert or replace `handle`'s ranges. Returns true if membership or ranges changed.
    pub fn insert(&mut self, handle: HandleId, ranges: Vec<SelectionRange>) -> bool {
        match self.members.get(&handle) {
            Some(existing) if *existing == ranges => false,
            _ => {
                self.members.insert(handle, ranges);
                true
            }
        }
    }

    /// Returns true if `handle` was a member
    pub fn remove(&mut self, handle: HandleId) -> bool {
        self.members.remove(&handle).is_some()
    }

    #[must_use]
    pub fn contains(&self, handle: HandleId) -> bool {
        self.members.contains_key(&handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.members.keys().copied()
    }

    #[must_use]
    pub fn ranges_of(&self, handle: HandleId) -> &[SelectionRange] {
        self.members.get(&handle).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All ranges in handle order
    #[must_use]
    pub fn ranges(&self) -> Vec<SelectionRange> {
        self.members.values().flatten().copied().collect()
    }
}
