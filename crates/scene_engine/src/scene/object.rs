//! Scene graph node
//!
//! An [`Object`] owns its transform, its bounding box and its components.
//! Tree links (parent, children) are plain [`ObjectKey`]s into the owning
//! [`SceneGraph`](crate::scene::SceneGraph) arena and are only rewritten by it.

use std::any::Any;

use crate::foundation::collections::{ObjectId, ObjectKey};
use crate::scene::aabb::AABB;
use crate::scene::component::{Component, ComponentTypeId, ErasedComponent};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::transform::Transform;

/// A node in the scene hierarchy
pub struct Object {
    key: ObjectKey,
    id: ObjectId,
    name: String,
    active: bool,
    visible: bool,

    transform: Transform,
    aabb: AABB,
    local_bounds: Option<AABB>,

    components: Vec<Box<dyn ErasedComponent>>,

    parent: Option<ObjectKey>,
    children: Vec<ObjectKey>,
    num_transforms_in_hierarchy: usize,
}

impl Object {
    pub(crate) fn new(key: ObjectKey, id: ObjectId, name: Option<&str>) -> Self {
        Self {
            key,
            id,
            name: name.unwrap_or_default().to_string(),
            active: true,
            visible: true,
            transform: Transform::new(key),
            aabb: AABB::default(),
            local_bounds: None,
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
            num_transforms_in_hierarchy: 1,
        }
    }

    /// Arena handle of this object
    pub fn key(&self) -> ObjectKey {
        self.key
    }

    /// Externally assigned identifier
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Replace the identifier; uniqueness is up to the caller
    pub fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the object
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Local active flag (ancestors not considered)
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Local visible flag (ancestors not considered)
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_active_flag(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_visible_flag(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Transform state; mutate it through the scene graph
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub(crate) fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// World-space bounds used by spatial indexing
    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    /// Overwrite the world-space bounds
    pub fn set_aabb(&mut self, aabb: AABB) {
        self.aabb = aabb;
    }

    /// Object-space bounds, if the object carries geometry
    pub fn local_bounds(&self) -> Option<&AABB> {
        self.local_bounds.as_ref()
    }

    pub(crate) fn set_local_bounds(&mut self, bounds: Option<AABB>) {
        self.local_bounds = bounds;
    }

    /// Parent object, `None` for roots
    pub fn parent(&self) -> Option<ObjectKey> {
        self.parent
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<ObjectKey>) {
        self.parent = parent;
        self.transform.set_parent(parent);
    }

    /// Children in insertion order
    pub fn children(&self) -> &[ObjectKey] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, child: ObjectKey) {
        self.children.push(child);
    }

    pub(crate) fn remove_child_link(&mut self, child: ObjectKey) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_children(&mut self) -> Vec<ObjectKey> {
        std::mem::take(&mut self.children)
    }

    /// Transforms in the subtree rooted here, this one included
    pub fn num_transforms_in_hierarchy(&self) -> usize {
        self.num_transforms_in_hierarchy
    }

    pub(crate) fn grow_hierarchy_count(&mut self, delta: usize) {
        self.num_transforms_in_hierarchy += delta;
    }

    pub(crate) fn shrink_hierarchy_count(&mut self, delta: usize) {
        debug_assert!(self.num_transforms_in_hierarchy > delta);
        self.num_transforms_in_hierarchy -= delta;
    }

    // ========== Components ==========

    /// Attach a component and return it
    ///
    /// # Panics
    ///
    /// Panics if a component with the same type tag is already attached.
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        match self.try_add_component(component) {
            Ok(component) => component,
            Err(err) => panic!("{err}"),
        }
    }

    /// Attach a component unless one of its type is already present
    pub fn try_add_component<T: Component>(&mut self, component: T) -> SceneResult<&mut T> {
        if self.has_component_type(T::TYPE_ID) {
            return Err(SceneError::DuplicateComponent {
                object: self.key,
                type_id: T::TYPE_ID,
            });
        }

        let mut component = component;
        component.attach(self.key);
        self.components.push(Box::new(component));
        log::trace!("Attached component {} to {}", T::TYPE_ID, self.id);

        let attached = self
            .components
            .last_mut()
            .and_then(|c| c.as_any_mut().downcast_mut::<T>())
            .expect("component pushed above has type T");
        Ok(attached)
    }

    /// Component of type `T`, if attached
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.get_component_by_type_id(T::TYPE_ID)
            .and_then(|c| c.downcast_ref::<T>())
    }

    /// Mutable component of type `T`, if attached
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find(|c| c.type_id_tag() == T::TYPE_ID)
            .and_then(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// Linear scan for the component carrying `type_id`
    pub fn get_component_by_type_id(&self, type_id: ComponentTypeId) -> Option<&dyn Any> {
        self.components
            .iter()
            .find(|c| c.type_id_tag() == type_id)
            .map(|c| c.as_any())
    }

    /// Whether a component with this tag is attached
    pub fn has_component_type(&self, type_id: ComponentTypeId) -> bool {
        self.components.iter().any(|c| c.type_id_tag() == type_id)
    }

    /// Type tags of attached components, in attachment order
    pub fn component_types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.components.iter().map(|c| c.type_id_tag())
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Destroy and drop the component of type `T`; false if absent
    pub fn remove_component<T: Component>(&mut self) -> bool {
        self.remove_component_by_type_id(T::TYPE_ID)
    }

    /// Destroy and drop the component carrying `type_id`; false if absent
    pub fn remove_component_by_type_id(&mut self, type_id: ComponentTypeId) -> bool {
        let Some(index) = self.components.iter().position(|c| c.type_id_tag() == type_id) else {
            return false;
        };

        let mut component = self.components.remove(index);
        debug_assert_eq!(component.object(), Some(self.key));
        component.destroy();
        true
    }

    fn destroy_components(&mut self) {
        for mut component in self.components.drain(..) {
            component.destroy();
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.destroy_components();
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("visible", &self.visible)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.component_types().collect::<Vec<_>>())
            .finish()
    }
}
