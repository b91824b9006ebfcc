//! Scene graph arena
//!
//! Owns every [`Object`] in a generation-checked slot map and is the only
//! place tree links are rewritten. Parent and child references are
//! [`ObjectKey`]s, so they never keep an object alive.
//!
//! World matrices are lazy. A local change on an object dirties the object
//! and every descendant; the next read rebuilds only the dirty part of the
//! chain from the nearest clean ancestor downwards. A dirty transform always
//! has dirty descendants, which lets propagation stop at subtrees that are
//! already dirty.

use crate::config::SceneConfig;
use crate::foundation::collections::{ObjectId, ObjectKey, SlotMap};
use crate::foundation::math::{translation_of, Mat4, Point3, Quat, Vec3};
use crate::scene::aabb::AABB;
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::object::Object;
use crate::scene::transform::Transform;
use crate::spatial::{ObjectBounds, QuadTree};

/// Arena of scene objects plus the hierarchy operations over them
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: SlotMap<ObjectKey, Object>,
    config: SceneConfig,
}

impl SceneGraph {
    /// Create an empty scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene with custom configuration
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            objects: SlotMap::with_key(),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ========== Lifecycle ==========

    /// Create a parentless object with an identity transform
    pub fn create_object(&mut self, id: ObjectId, name: Option<&str>) -> ObjectKey {
        let key = self.objects.insert_with_key(|key| Object::new(key, id, name));
        log::debug!("Created object {} ({:?}) as {:?}", id, name.unwrap_or(""), key);
        key
    }

    /// Destroy one object and its components
    ///
    /// Children are not destroyed: they are detached and become roots.
    /// Use [`destroy_subtree`](Self::destroy_subtree) to cascade.
    pub fn destroy_object(&mut self, key: ObjectKey) -> bool {
        if !self.objects.contains_key(key) {
            return false;
        }

        self.detach(key);

        let children = self.objects[key].take_children();
        for &child in &children {
            self.objects[child].set_parent_link(None);
            self.invalidate_subtree(child);
        }
        if !children.is_empty() {
            log::debug!("Orphaned {} children of {:?}", children.len(), key);
        }

        if let Some(object) = self.objects.remove(key) {
            log::debug!("Destroyed object {} ({:?})", object.id(), object.name());
        }
        true
    }

    /// Destroy an object together with all of its descendants
    ///
    /// Returns the number of objects destroyed.
    pub fn destroy_subtree(&mut self, key: ObjectKey) -> usize {
        if !self.objects.contains_key(key) {
            return 0;
        }

        self.detach(key);
        let subtree = self.collect_subtree(key);
        // Leaves first, so each object is childless when removed
        for &node in subtree.iter().rev() {
            self.objects.remove(node);
        }
        log::debug!("Destroyed subtree of {:?} ({} objects)", key, subtree.len());
        subtree.len()
    }

    // ========== Lookup ==========

    /// Object behind `key`
    pub fn get(&self, key: ObjectKey) -> Option<&Object> {
        self.objects.get(key)
    }

    /// Mutable object behind `key`
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut Object> {
        self.objects.get_mut(key)
    }

    /// Whether `key` resolves to a live object
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects in arena order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &Object)> {
        self.objects.iter()
    }

    /// Parentless objects
    pub fn roots(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.objects
            .iter()
            .filter(|(_, object)| object.parent().is_none())
            .map(|(key, _)| key)
    }

    /// First object with this name
    pub fn find_by_name(&self, name: &str) -> Option<ObjectKey> {
        self.objects
            .iter()
            .find(|(_, object)| object.name() == name)
            .map(|(key, _)| key)
    }

    /// First object with this identifier
    pub fn find_by_id(&self, id: ObjectId) -> Option<ObjectKey> {
        self.objects
            .iter()
            .find(|(_, object)| object.id() == id)
            .map(|(key, _)| key)
    }

    /// Parent of `key`
    pub fn parent(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.objects.get(key)?.parent()
    }

    /// Children of `key`; empty for unknown keys
    pub fn children(&self, key: ObjectKey) -> &[ObjectKey] {
        match self.objects.get(key) {
            Some(object) => object.children(),
            None => &[],
        }
    }

    /// Number of ancestors above `key`
    pub fn depth(&self, key: ObjectKey) -> Option<usize> {
        let mut current = self.objects.get(key)?;
        let mut depth = 0;
        while let Some(parent) = current.parent() {
            current = &self.objects[parent];
            depth += 1;
        }
        Some(depth)
    }

    /// Descendants of `key` in pre-order, `key` itself excluded
    pub fn descendants(&self, key: ObjectKey) -> Vec<ObjectKey> {
        if !self.objects.contains_key(key) {
            return Vec::new();
        }
        let mut subtree = self.collect_subtree(key);
        subtree.remove(0);
        subtree
    }

    /// True if `candidate` is a strict ancestor of `key`
    pub fn has_object_in_parent_hierarchy(&self, key: ObjectKey, candidate: ObjectKey) -> bool {
        let mut current = self.parent(key);
        while let Some(ancestor) = current {
            if ancestor == candidate {
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    // ========== Hierarchy ==========

    /// Parent `child` under `parent`, detaching it from any previous parent
    ///
    /// The caller must not create a cycle: `child` may not be `parent` or one
    /// of its ancestors. This is debug-asserted; see
    /// [`try_add_child`](Self::try_add_child) for a checked variant.
    pub fn add_child(&mut self, parent: ObjectKey, child: ObjectKey) -> SceneResult<()> {
        self.ensure_exists(parent)?;
        self.ensure_exists(child)?;
        debug_assert!(
            !self.would_create_cycle(parent, child),
            "parenting {child:?} under {parent:?} would create a cycle"
        );
        self.attach(parent, child);
        Ok(())
    }

    /// [`add_child`](Self::add_child) that rejects cycles with an error
    pub fn try_add_child(&mut self, parent: ObjectKey, child: ObjectKey) -> SceneResult<()> {
        self.ensure_exists(parent)?;
        self.ensure_exists(child)?;
        if self.would_create_cycle(parent, child) {
            return Err(SceneError::HierarchyCycle { parent, child });
        }
        self.attach(parent, child);
        Ok(())
    }

    /// Detach `child` from `parent`; the subtree becomes a new root
    ///
    /// Returns false if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: ObjectKey, child: ObjectKey) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child)
    }

    /// Detach `key` from whatever parent it has
    pub fn detach(&mut self, key: ObjectKey) -> bool {
        let Some(parent) = self.parent(key) else {
            return false;
        };

        self.objects[parent].remove_child_link(key);
        let count = self.objects[key].num_transforms_in_hierarchy();
        self.for_each_ancestor_inclusive(parent, |object| object.shrink_hierarchy_count(count));

        self.objects[key].set_parent_link(None);
        self.invalidate_subtree(key);
        true
    }

    fn attach(&mut self, parent: ObjectKey, child: ObjectKey) {
        self.detach(child);

        self.objects[parent].push_child(child);
        let count = self.objects[child].num_transforms_in_hierarchy();
        self.for_each_ancestor_inclusive(parent, |object| object.grow_hierarchy_count(count));

        self.objects[child].set_parent_link(Some(parent));
        self.invalidate_subtree(child);
    }

    fn would_create_cycle(&self, parent: ObjectKey, child: ObjectKey) -> bool {
        parent == child || self.has_object_in_parent_hierarchy(parent, child)
    }

    fn ensure_exists(&self, key: ObjectKey) -> SceneResult<()> {
        if self.objects.contains_key(key) {
            Ok(())
        } else {
            Err(SceneError::ObjectNotFound(key))
        }
    }

    fn for_each_ancestor_inclusive(&mut self, start: ObjectKey, mut f: impl FnMut(&mut Object)) {
        let mut current = Some(start);
        while let Some(key) = current {
            let object = &mut self.objects[key];
            f(object);
            current = object.parent();
        }
    }

    /// Pre-order keys of the subtree rooted at `key`, root first
    fn collect_subtree(&self, key: ObjectKey) -> Vec<ObjectKey> {
        let mut result = Vec::with_capacity(self.objects[key].num_transforms_in_hierarchy());
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.objects[current].children().iter().rev());
        }
        result
    }

    // ========== Flags ==========

    /// Set the active flag, recursing into children when configured to
    pub fn set_active(&mut self, key: ObjectKey, active: bool) -> SceneResult<()> {
        self.ensure_exists(key)?;
        for node in self.flag_targets(key) {
            self.objects[node].set_active_flag(active);
        }
        Ok(())
    }

    /// Set the visible flag, recursing into children when configured to
    pub fn set_visible(&mut self, key: ObjectKey, visible: bool) -> SceneResult<()> {
        self.ensure_exists(key)?;
        for node in self.flag_targets(key) {
            self.objects[node].set_visible_flag(visible);
        }
        Ok(())
    }

    /// Active flag of `key` and every ancestor combined
    pub fn effective_active(&self, key: ObjectKey) -> bool {
        self.all_up_chain(key, Object::is_active)
    }

    /// Visible flag of `key` and every ancestor combined
    pub fn effective_visible(&self, key: ObjectKey) -> bool {
        self.all_up_chain(key, Object::is_visible)
    }

    fn flag_targets(&self, key: ObjectKey) -> Vec<ObjectKey> {
        if self.config.propagate_flags {
            self.collect_subtree(key)
        } else {
            vec![key]
        }
    }

    fn all_up_chain(&self, key: ObjectKey, flag: impl Fn(&Object) -> bool) -> bool {
        let mut current = self.objects.get(key);
        while let Some(object) = current {
            if !flag(object) {
                return false;
            }
            current = object.parent().and_then(|p| self.objects.get(p));
        }
        self.objects.contains_key(key)
    }

    // ========== Transforms ==========

    /// Transform of `key`
    pub fn transform(&self, key: ObjectKey) -> Option<&Transform> {
        self.objects.get(key).map(Object::transform)
    }

    /// Set local position and dirty the subtree
    pub fn set_local_position(&mut self, key: ObjectKey, position: Vec3) -> SceneResult<()> {
        self.mutate_local(key, |t| t.set_local_position(position))
    }

    /// Set local rotation and dirty the subtree
    pub fn set_local_rotation(&mut self, key: ObjectKey, rotation: Quat) -> SceneResult<()> {
        self.mutate_local(key, |t| t.set_local_rotation(rotation))
    }

    /// Set local scale and dirty the subtree
    pub fn set_local_scale(&mut self, key: ObjectKey, scale: Vec3) -> SceneResult<()> {
        self.mutate_local(key, |t| t.set_local_scale(scale))
    }

    fn mutate_local(&mut self, key: ObjectKey, f: impl FnOnce(&mut Transform)) -> SceneResult<()> {
        let object = self.objects.get_mut(key).ok_or(SceneError::ObjectNotFound(key))?;
        f(object.transform_mut());
        self.invalidate_descendants(key);
        Ok(())
    }

    /// World matrix of `key`, rebuilding stale links of the parent chain
    pub fn world_matrix(&self, key: ObjectKey) -> Option<Mat4> {
        // Walk up until a clean ancestor (or the root) is found
        let mut stale = Vec::new();
        let mut base = None;
        let mut current = key;
        loop {
            let object = self.objects.get(current)?;
            if let Some(world) = object.transform().cached_world_matrix() {
                base = Some(world);
                break;
            }
            stale.push(current);
            match object.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let mut world = base;
        for &node in stale.iter().rev() {
            world = Some(self.objects[node].transform().resolve(world.as_ref()));
        }
        world
    }

    /// World-space position
    pub fn position(&self, key: ObjectKey) -> Option<Vec3> {
        self.world_matrix(key).map(|world| translation_of(&world))
    }

    /// World-space rotation: the product of local rotations down the chain
    pub fn rotation(&self, key: ObjectKey) -> Option<Quat> {
        let mut object = self.objects.get(key)?;
        let mut rotation = object.transform().local_rotation();
        while let Some(parent) = object.parent() {
            object = &self.objects[parent];
            rotation = object.transform().local_rotation() * rotation;
        }
        Some(rotation)
    }

    /// World-space scale: the per-axis product of local scales down the chain
    ///
    /// Exact only while no ancestor combines rotation with non-uniform scale.
    pub fn scale(&self, key: ObjectKey) -> Option<Vec3> {
        let mut object = self.objects.get(key)?;
        let mut scale = object.transform().local_scale();
        while let Some(parent) = object.parent() {
            object = &self.objects[parent];
            scale = object.transform().local_scale().component_mul(&scale);
        }
        Some(scale)
    }

    /// Place `key` at a world-space position
    ///
    /// Fails with [`SceneError::DegenerateParentMatrix`] when the parent's
    /// world matrix cannot be inverted; the transform is left untouched.
    pub fn set_position(&mut self, key: ObjectKey, position: Vec3) -> SceneResult<()> {
        let local = match self.parent_of_existing(key)? {
            None => position,
            Some(parent) => {
                let inverse = self
                    .world_matrix(parent)
                    .and_then(|world| world.try_inverse())
                    .filter(|inverse| inverse.iter().all(|v| v.is_finite()))
                    .ok_or_else(|| {
                        log::warn!("Cannot set world position of {:?}: parent matrix is singular", key);
                        SceneError::DegenerateParentMatrix(key)
                    })?;
                inverse.transform_point(&Point3::from(position)).coords
            }
        };
        self.set_local_position(key, local)
    }

    /// Give `key` a world-space rotation
    pub fn set_rotation(&mut self, key: ObjectKey, rotation: Quat) -> SceneResult<()> {
        let local = match self.parent_of_existing(key)? {
            None => rotation,
            Some(parent) => {
                let parent_rotation = self.rotation(parent).ok_or(SceneError::ObjectNotFound(parent))?;
                parent_rotation.inverse() * rotation
            }
        };
        self.set_local_rotation(key, local)
    }

    /// Give `key` a world-space scale
    ///
    /// Fails with [`SceneError::DegenerateParentMatrix`] when an ancestor has
    /// zero scale on some axis.
    pub fn set_scale(&mut self, key: ObjectKey, scale: Vec3) -> SceneResult<()> {
        let local = match self.parent_of_existing(key)? {
            None => scale,
            Some(parent) => {
                let parent_scale = self.scale(parent).ok_or(SceneError::ObjectNotFound(parent))?;
                if parent_scale.iter().any(|s| *s == 0.0) {
                    log::warn!("Cannot set world scale of {:?}: parent scale is zero", key);
                    return Err(SceneError::DegenerateParentMatrix(key));
                }
                scale.component_div(&parent_scale)
            }
        };
        self.set_local_scale(key, local)
    }

    fn parent_of_existing(&self, key: ObjectKey) -> SceneResult<Option<ObjectKey>> {
        self.objects
            .get(key)
            .map(Object::parent)
            .ok_or(SceneError::ObjectNotFound(key))
    }

    /// Reset locals to identity and rebuild the world matrix immediately
    pub fn reset_to_identity(&mut self, key: ObjectKey) -> SceneResult<()> {
        let parent_world = match self.parent_of_existing(key)? {
            Some(parent) => self.world_matrix(parent),
            None => None,
        };
        self.objects[key].transform_mut().reset_to_identity(parent_world.as_ref());
        self.invalidate_descendants(key);
        Ok(())
    }

    /// Eagerly rebuild every world matrix in the subtree rooted at `key`
    ///
    /// Returns the number of transforms recomputed.
    pub fn update_all_transforms_in_hierarchy(&self, key: ObjectKey) -> usize {
        let Some(root) = self.objects.get(key) else {
            return 0;
        };
        let root_parent_world = root.parent().and_then(|parent| self.world_matrix(parent));

        let mut updated = 0;
        let mut stack: Vec<(ObjectKey, Option<Mat4>)> = Vec::with_capacity(root.num_transforms_in_hierarchy());
        stack.push((key, root_parent_world));
        while let Some((current, parent_world)) = stack.pop() {
            let object = &self.objects[current];
            let world = object.transform().resolve(parent_world.as_ref());
            updated += 1;
            stack.extend(object.children().iter().map(|&child| (child, Some(world))));
        }
        log::trace!("Refreshed {} transforms under {:?}", updated, key);
        updated
    }

    /// Dirty every transform in the subtree, `key` included
    fn invalidate_subtree(&self, key: ObjectKey) {
        for node in self.collect_subtree(key) {
            self.objects[node].transform().invalidate();
        }
    }

    /// Dirty the descendants of `key`, skipping subtrees already dirty
    fn invalidate_descendants(&self, key: ObjectKey) {
        let mut stack: Vec<ObjectKey> = self.objects[key].children().to_vec();
        while let Some(current) = stack.pop() {
            let object = &self.objects[current];
            if object.transform().invalidate() {
                stack.extend_from_slice(object.children());
            }
        }
    }

    // ========== Bounds ==========

    /// Attach object-space bounds; the world AABB follows the transform
    pub fn set_local_bounds(&mut self, key: ObjectKey, bounds: Option<AABB>) -> SceneResult<()> {
        self.objects
            .get_mut(key)
            .ok_or(SceneError::ObjectNotFound(key))?
            .set_local_bounds(bounds);
        self.refresh_aabb(key);
        Ok(())
    }

    /// Regenerate the world AABB from local bounds and the current world
    /// matrix; objects without local bounds keep their stored AABB.
    pub fn refresh_aabb(&mut self, key: ObjectKey) -> Option<AABB> {
        let world = self.world_matrix(key)?;
        let object = self.objects.get_mut(key)?;
        if let Some(local) = object.local_bounds().copied() {
            object.set_aabb(local.transformed(&world));
        }
        Some(*object.aabb())
    }

    /// World AABB as of the current transform, without storing it
    ///
    /// Falls back to the stored AABB for objects without local bounds.
    pub fn world_aabb(&self, key: ObjectKey) -> Option<AABB> {
        let object = self.objects.get(key)?;
        match object.local_bounds() {
            Some(local) => self.world_matrix(key).map(|world| local.transformed(&world)),
            None => Some(*object.aabb()),
        }
    }

    /// Build a quad tree over `keys` from their stored world AABBs
    ///
    /// Uses the scene's configured quad tree parameters. Keys that no longer
    /// resolve are skipped.
    pub fn build_quad_tree(&self, keys: impl IntoIterator<Item = ObjectKey>) -> QuadTree {
        let mut tree = QuadTree::new(self.config.quad_tree);
        for key in keys {
            tree.add_object(self, key);
        }
        tree.init(self);
        tree
    }

    /// Refresh the world AABB of every object in the subtree
    pub fn refresh_aabbs_in_hierarchy(&mut self, key: ObjectKey) {
        if !self.objects.contains_key(key) {
            return;
        }
        self.update_all_transforms_in_hierarchy(key);
        for node in self.collect_subtree(key) {
            self.refresh_aabb(node);
        }
    }
}

impl ObjectBounds for SceneGraph {
    fn object_aabb(&self, key: ObjectKey) -> Option<AABB> {
        self.objects.get(key).map(|object| *object.aabb())
    }
}
