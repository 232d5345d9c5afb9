//! Structure implementations for volray-rs.
//!
//! Currently hosts a single entity, [`RaycastVolume`], which turns a raw
//! scalar volume into a colored point cloud and renders it as billboarded
//! points under the shared orbit camera.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod raycast_volume;

pub use raycast_volume::{KeyBindings, RaycastVolume, Toggle};
