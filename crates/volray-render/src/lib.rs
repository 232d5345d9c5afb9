//! Rendering backend for volray-rs.
//!
//! This crate provides the wgpu side of the pipeline:
//! - [`GpuContext`] for device acquisition and the point pipeline
//! - [`PointBufferSet`], the grow-only device mirror of a point cloud
//! - [`HistogramTexture`] and [`TransferFunctionTexture`] display textures
//! - [`OrbitCamera`] view management
//! - [`PointPass`], the device-backed render context

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod buffer;
pub mod camera;
pub mod context;
pub mod error;
pub mod pass;
pub mod point_buffers;
pub mod textures;

pub use camera::OrbitCamera;
pub use context::{GpuContext, TARGET_FORMAT};
pub use error::{RenderError, RenderResult};
pub use pass::PointPass;
pub use point_buffers::{CommitPlan, PointBufferSet};
pub use textures::{HistogramTexture, TransferFunctionTexture, TRANSFER_TEXTURE_WIDTH};
