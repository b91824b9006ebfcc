//! Foundation layer shared by the scene and spatial modules
//!
//! - `math`: nalgebra aliases and TRS composition
//! - `collections`: arena keys and caller-assigned object ids
//! - `logging`: env_logger setup for binaries and tests

pub mod collections;
pub mod logging;
pub mod math;
