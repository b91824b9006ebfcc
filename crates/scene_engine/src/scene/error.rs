//! Scene error types

use crate::foundation::collections::ObjectKey;
use crate::foundation::math::Vec3;
use crate::scene::component::ComponentTypeId;
use thiserror::Error;

/// Result alias for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors reported by checked scene operations
///
/// Unchecked variants of the same operations treat these as contract
/// violations and panic instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Key does not resolve to a live object
    #[error("Object not found: {0:?}")]
    ObjectNotFound(ObjectKey),

    /// Object already holds a component with this type tag
    #[error("Object {object:?} already has a component of type {type_id}")]
    DuplicateComponent {
        /// Owner that rejected the component
        object: ObjectKey,
        /// Offending type tag
        type_id: ComponentTypeId,
    },

    /// Parenting would make an object its own ancestor
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// Requested parent
        parent: ObjectKey,
        /// Requested child
        child: ObjectKey,
    },

    /// Parent world matrix cannot be inverted
    #[error("Parent world matrix of {0:?} is not invertible")]
    DegenerateParentMatrix(ObjectKey),

    /// Min corner exceeds max corner on some axis
    #[error("Invalid bounds: min {min:?} exceeds max {max:?}")]
    InvalidBounds {
        /// Requested minimum corner
        min: Vec3,
        /// Requested maximum corner
        max: Vec3,
    },
}
