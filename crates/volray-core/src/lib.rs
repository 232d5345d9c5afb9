//! Core abstractions for volray-rs.
//!
//! This crate provides the CPU side of the volume rendering pipeline:
//! - [`Volume`] storage with 8-bit/16-bit sample domains
//! - [`Histogram`] intensity distributions
//! - [`TransferFunction`] intensity-to-color mappings
//! - [`sampler`] for deriving colored point clouds
//! - The [`Structure`] and [`RenderContext`] seams toward the scene graph
//!   and GPU backend

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Sampler settings legitimately carry several boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Numeric conversions in the sampling/binning paths are range-checked by construction
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod error;
pub mod histogram;
pub mod options;
pub mod sampler;
pub mod structure;
pub mod transfer;
pub mod volume;

pub use error::{Result, VolrayError};
pub use histogram::Histogram;
pub use options::Options;
pub use sampler::{sample_volume, PointCloud, SamplerSettings};
pub use structure::{PointUniforms, RenderContext, Structure};
pub use transfer::TransferFunction;
pub use volume::{SampleFormat, Volume};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec3, Vec2, Vec3, Vec4};
