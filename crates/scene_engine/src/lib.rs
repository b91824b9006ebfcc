//! # Scene Engine
//!
//! Scene graph core for a game engine: an object hierarchy with lazily
//! evaluated world transforms, per-object components and bounding boxes,
//! and a quad tree for partitioning objects over the X-Z plane.
//!
//! ## Features
//!
//! - **Object Hierarchy**: Arena-owned objects linked by generation-checked keys
//! - **Lazy Transforms**: World matrices rebuilt only along dirty chains
//! - **Components**: At most one component per type tag on each object
//! - **Spatial Partitioning**: Growth-capped quad tree built from world AABBs
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut scene = SceneGraph::new();
//! let ship = scene.create_object(ObjectId(1), Some("ship"));
//! let turret = scene.create_object(ObjectId(2), Some("turret"));
//! scene.add_child(ship, turret)?;
//!
//! scene.set_local_position(ship, Vec3::new(1.0, 0.0, 0.0))?;
//! scene.set_local_position(turret, Vec3::new(0.0, 1.0, 0.0))?;
//! assert_eq!(scene.position(turret), Some(Vec3::new(1.0, 1.0, 0.0)));
//! # Ok::<(), SceneError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::must_use_candidate)]

pub mod config;
pub mod foundation;
pub mod scene;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, QuadTreeConfig, SceneConfig},
        foundation::{
            collections::{ObjectId, ObjectKey},
            math::{Mat4, Quat, Vec2, Vec3},
        },
        scene::{Component, ComponentTypeId, Object, SceneError, SceneGraph, SceneResult, AABB},
        spatial::{Insertion, ObjectBounds, QuadTree, QuadTreeLeaf, Quadrant},
    };
}
