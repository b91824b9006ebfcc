//! Scene graph
//!
//! Objects live in a [`SceneGraph`] arena and form a forest through weak
//! parent/child keys. Each object carries a [`Transform`] whose world matrix
//! is computed lazily, an [`AABB`], and a set of [`Component`]s keyed by
//! [`ComponentTypeId`].
//!
//! ```text
//! SceneGraph (arena)
//!      ↓
//! Object ── Transform (local TRS + cached world matrix)
//!      │
//!      ├── AABB (world bounds)
//!      └── Components (one per type id)
//! ```

pub(crate) mod aabb;
pub(crate) mod component;
pub(crate) mod error;
pub(crate) mod object;
pub(crate) mod scene_graph;
pub(crate) mod transform;

#[cfg(test)]
mod tests;

pub use aabb::AABB;
pub use component::{Component, ComponentTypeId};
pub use error::{SceneError, SceneResult};
pub use object::Object;
pub use scene_graph::SceneGraph;
pub use transform::{DirtyFlags, Transform, WorldMatrixCache};
