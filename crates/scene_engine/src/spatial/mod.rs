//! Spatial partitioning data structures
//!
//! Provides the quad tree used for visibility and broad-phase queries over
//! scene objects. Traversal code (culling, proximity) reads the partitioned
//! storage directly; this module only builds and maintains it.

mod quad_tree;

pub use quad_tree::{Insertion, QuadTree, QuadTreeLeaf, Quadrant};

use crate::foundation::collections::{ObjectKey, SecondaryMap};
use crate::scene::AABB;

/// Source of world-space bounds for objects referenced by a spatial index
///
/// The index stores only keys; bounds are looked up on demand so the
/// index never owns or aliases scene objects.
pub trait ObjectBounds {
    /// Current bounds of `key`, `None` if it no longer exists
    fn object_aabb(&self, key: ObjectKey) -> Option<AABB>;
}

impl ObjectBounds for SecondaryMap<ObjectKey, AABB> {
    fn object_aabb(&self, key: ObjectKey) -> Option<AABB> {
        self.get(key).copied()
    }
}
