//! Per-object transform with a lazily recomputed world matrix
//!
//! A transform is either Clean (cached world matrix valid) or Dirty (one or
//! more of the position/rotation/scale bits set). Local setters move it to
//! Dirty; resolving the world matrix moves it back to Clean.
//!
//! A transform cannot see its children, so the mutating entry points live on
//! [`SceneGraph`](crate::scene::SceneGraph), which dirties the whole subtree
//! alongside the local change.

use std::cell::Cell;

use bitflags::bitflags;

use crate::foundation::collections::ObjectKey;
use crate::foundation::math::{Mat4, Quat, Trs, Vec3};

bitflags! {
    /// Which local components changed since the world matrix was last built
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// Local position changed
        const POSITION = 0b001;
        /// Local rotation changed
        const ROTATION = 0b010;
        /// Local scale changed
        const SCALE = 0b100;
    }
}

/// World matrix plus the dirty bits that say whether it is still valid.
///
/// Logically read-only accessors may refill the cache, so both fields sit in
/// `Cell`s. The type is `!Sync`; a scene is driven from a single thread.
#[derive(Debug)]
pub struct WorldMatrixCache {
    matrix: Cell<Mat4>,
    dirty: Cell<DirtyFlags>,
}

impl WorldMatrixCache {
    /// Clean cache holding `matrix`
    pub fn new(matrix: Mat4) -> Self {
        Self {
            matrix: Cell::new(matrix),
            dirty: Cell::new(DirtyFlags::empty()),
        }
    }

    /// Cached matrix, or `None` while dirty
    pub fn get(&self) -> Option<Mat4> {
        if self.dirty.get().is_empty() {
            Some(self.matrix.get())
        } else {
            None
        }
    }

    /// Store a freshly computed matrix and clear every dirty bit
    pub fn store(&self, matrix: Mat4) {
        self.matrix.set(matrix);
        self.dirty.set(DirtyFlags::empty());
    }

    /// Set dirty bits; returns true if the cache was clean beforehand
    pub fn invalidate(&self, flags: DirtyFlags) -> bool {
        let before = self.dirty.get();
        self.dirty.set(before | flags);
        before.is_empty()
    }

    /// Currently set dirty bits
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty.get()
    }
}

impl Clone for WorldMatrixCache {
    fn clone(&self) -> Self {
        Self {
            matrix: Cell::new(self.matrix.get()),
            dirty: Cell::new(self.dirty.get()),
        }
    }
}

/// Local TRS state of one object plus its cached world matrix
#[derive(Debug, Clone)]
pub struct Transform {
    local: Trs,
    is_identity: bool,
    cache: WorldMatrixCache,

    // Non-owning back-references
    parent: Option<ObjectKey>,
    owner: ObjectKey,
}

impl Transform {
    /// Identity transform owned by `owner`, with no parent
    pub fn new(owner: ObjectKey) -> Self {
        Self {
            local: Trs::identity(),
            is_identity: true,
            cache: WorldMatrixCache::new(Mat4::identity()),
            parent: None,
            owner,
        }
    }

    /// Object this transform belongs to
    pub fn owner(&self) -> ObjectKey {
        self.owner
    }

    /// Parent object whose world matrix this one composes with
    pub fn parent(&self) -> Option<ObjectKey> {
        self.parent
    }

    /// Local position
    pub fn local_position(&self) -> Vec3 {
        self.local.position
    }

    /// Local rotation
    pub fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.local.scale
    }

    /// Local position, rotation and scale
    pub fn local(&self) -> &Trs {
        &self.local
    }

    /// Whether the identity fast path is active
    pub fn is_identity(&self) -> bool {
        self.is_identity
    }

    /// Local `T * R * S` matrix
    pub fn local_matrix(&self) -> Mat4 {
        if self.is_identity {
            Mat4::identity()
        } else {
            self.local.to_matrix()
        }
    }

    /// True while the cached world matrix is stale
    pub fn is_dirty(&self) -> bool {
        !self.cache.dirty_flags().is_empty()
    }

    /// Dirty bits accumulated since the last world matrix build
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.cache.dirty_flags()
    }

    /// World matrix if the cache is valid
    pub fn cached_world_matrix(&self) -> Option<Mat4> {
        self.cache.get()
    }

    pub(crate) fn set_local_position(&mut self, position: Vec3) {
        self.local.position = position;
        self.is_identity = false;
        self.cache.invalidate(DirtyFlags::POSITION);
    }

    pub(crate) fn set_local_rotation(&mut self, rotation: Quat) {
        self.local.rotation = rotation;
        self.is_identity = false;
        self.cache.invalidate(DirtyFlags::ROTATION);
    }

    pub(crate) fn set_local_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
        self.is_identity = false;
        self.cache.invalidate(DirtyFlags::SCALE);
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ObjectKey>) {
        self.parent = parent;
        self.cache.invalidate(DirtyFlags::all());
    }

    /// Dirty every bit; returns true if the transform was clean before
    pub(crate) fn invalidate(&self) -> bool {
        self.cache.invalidate(DirtyFlags::all())
    }

    /// Rebuild the world matrix from the parent's (already valid) world matrix
    pub(crate) fn resolve(&self, parent_world: Option<&Mat4>) -> Mat4 {
        let world = match (parent_world, self.is_identity) {
            (Some(parent), true) => *parent,
            (Some(parent), false) => parent * self.local.to_matrix(),
            (None, _) => self.local_matrix(),
        };
        self.cache.store(world);
        world
    }

    /// Identity locals with an eagerly rebuilt world matrix
    pub(crate) fn reset_to_identity(&mut self, parent_world: Option<&Mat4>) {
        self.local = Trs::identity();
        self.is_identity = true;
        self.resolve(parent_world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::KeyData;

    fn key(n: u64) -> ObjectKey {
        ObjectKey::from(KeyData::from_ffi(n | (1 << 32)))
    }

    #[test]
    fn test_new_transform_is_clean_identity() {
        let transform = Transform::new(key(1));

        assert!(transform.is_identity());
        assert!(!transform.is_dirty());
        assert_eq!(transform.cached_world_matrix(), Some(Mat4::identity()));
        assert_eq!(transform.owner(), key(1));
        assert!(transform.parent().is_none());
    }

    #[test]
    fn test_setters_record_dirty_bits() {
        let mut transform = Transform::new(key(1));

        transform.set_local_position(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.dirty_flags(), DirtyFlags::POSITION);
        assert!(!transform.is_identity());
        assert!(transform.cached_world_matrix().is_none());

        transform.set_local_scale(Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(transform.dirty_flags(), DirtyFlags::POSITION | DirtyFlags::SCALE);

        transform.resolve(None);
        assert!(!transform.is_dirty());
    }

    #[test]
    fn test_resolve_composes_parent_first() {
        let mut transform = Transform::new(key(1));
        transform.set_local_position(Vec3::new(0.0, 1.0, 0.0));

        let parent = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 2.0, 2.0));
        let world = transform.resolve(Some(&parent));

        assert_relative_eq!(world, parent * transform.local_matrix());
        assert_relative_eq!(world.m24, 2.0);
    }

    #[test]
    fn test_identity_fast_path_copies_parent() {
        let transform = Transform::new(key(1));
        transform.invalidate();

        let parent = Mat4::new_translation(&Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(transform.resolve(Some(&parent)), parent);
    }

    #[test]
    fn test_reset_to_identity_is_eager() {
        let mut transform = Transform::new(key(1));
        transform.set_local_rotation(Quat::from_axis_angle(&Vec3::z_axis(), 1.0));
        transform.set_local_position(Vec3::new(9.0, 9.0, 9.0));

        let parent = Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0));
        transform.reset_to_identity(Some(&parent));

        assert!(transform.is_identity());
        assert_eq!(transform.cached_world_matrix(), Some(parent));
        assert_eq!(transform.local(), &Trs::identity());
    }

    #[test]
    fn test_invalidate_reports_prior_state() {
        let transform = Transform::new(key(1));
        assert!(transform.invalidate());
        assert!(!transform.invalidate());
    }
}
