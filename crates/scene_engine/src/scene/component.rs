//! Component contract for behaviour attached to scene objects
//!
//! Concrete kinds (render, physics, script) live outside this crate. The
//! scene only knows a component's type tag and its lifecycle hooks.
//! Collaborators a component needs (renderer, physics world) are handed to
//! its constructor by the caller; the scene never provides them.

use std::any::Any;
use std::fmt;

use crate::foundation::collections::ObjectKey;

/// Stable integer tag identifying a component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u32);

impl ComponentTypeId {
    /// Pack a four-character code, first byte most significant
    pub const fn from_fourcc(code: &[u8; 4]) -> Self {
        Self(
            (code[0] as u32) << 24
                | (code[1] as u32) << 16
                | (code[2] as u32) << 8
                | code[3] as u32,
        )
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(u8::is_ascii_graphic) {
            bytes.iter().try_for_each(|&b| write!(f, "{}", b as char))
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

/// Behaviour attached to exactly one object
///
/// An object holds at most one component per [`TYPE_ID`](Self::TYPE_ID).
pub trait Component: Any {
    /// Tag shared by every instance of this kind
    const TYPE_ID: ComponentTypeId;

    /// Called once when the component is attached; `owner` is the object
    /// that now holds it.
    fn attach(&mut self, owner: ObjectKey);

    /// Owning object, if attached
    fn object(&self) -> Option<ObjectKey>;

    /// Detach and unregister hook, run right before the component is
    /// dropped by `remove_component` or by destruction of its object.
    fn destroy(&mut self) {}
}

/// Object-safe view of a [`Component`] used for storage
pub(crate) trait ErasedComponent {
    fn type_id_tag(&self) -> ComponentTypeId;
    fn object(&self) -> Option<ObjectKey>;
    fn destroy(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedComponent for T {
    fn type_id_tag(&self) -> ComponentTypeId {
        T::TYPE_ID
    }

    fn object(&self) -> Option<ObjectKey> {
        Component::object(self)
    }

    fn destroy(&mut self) {
        Component::destroy(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
