//! Collision groups
//!
//! Two bodies are paired only if their group sets intersect. Sets are kept
//! sorted so the test is a binary search of the shorter set in the longer.

use std::sync::Arc;

static DEFAULT_GROUP_IDS: [u32; 1] = [0];

/// Shared default groups, returned by `Body::groups` unless overridden
pub static DEFAULT_COLLISION_GROUPS: CollisionGroups = CollisionGroups(GroupSet::Default);

#[derive(Debug, Clone)]
enum GroupSet {
    /// `{0}`: collides with every other default-group body
    Default,
    /// Sorted, deduplicated ids
    Custom(Arc<[u32]>),
}

/// A sorted set of collision group ids
///
/// Cloning shares the underlying set, which lets `same_group` short-circuit
/// on identity.
#[derive(Debug, Clone)]
pub struct CollisionGroups(GroupSet);

impl Default for CollisionGroups {
    fn default() -> Self {
        Self(GroupSet::Default)
    }
}

impl CollisionGroups {
    /// Build a group set from arbitrary ids (sorted and deduplicated here)
    pub fn new(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(GroupSet::Custom(ids.into()))
    }

    pub fn ids(&self) -> &[u32] {
        match &self.0 {
            GroupSet::Default => &DEFAULT_GROUP_IDS,
            GroupSet::Custom(ids) => ids,
        }
    }

    /// True if the two sets share at least one id
    pub fn same_group(&self, other: &Self) -> bool {
        let a = self.ids();
        let b = other.ids();

        // Same underlying set
        if !a.is_empty() && std::ptr::eq(a, b) {
            return true;
        }

        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        short.iter().any(|g| long.binary_search(g).is_ok())
    }
}
