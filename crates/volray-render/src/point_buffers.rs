//! Device-side mirror of a sampled point cloud.

use glam::{Vec3, Vec4};
use volray_core::{PointCloud, PointUniforms};

use crate::buffer::{create_storage_buffer, create_uniform_buffer, update_buffer};

/// GPU buffers backing a point cloud: position and color storage buffers
/// plus the per-draw uniform buffer, bound together in one bind group.
///
/// Capacity is grow-only: committing a cloud that fits within the current
/// allocation overwrites the buffers in place and keeps the existing bind
/// group; only a larger cloud reallocates and rebinds.
pub struct PointBufferSet {
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    len: u32,
}

/// What a commit has to do for a given cloud size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitPlan {
    /// Whether new buffers (and a new bind group) are needed.
    pub reallocate: bool,
    /// Point capacity after the commit.
    pub capacity: usize,
}

impl CommitPlan {
    /// Decides between in-place update and reallocation.
    #[must_use]
    pub fn for_size(capacity: usize, len: usize) -> Self {
        if len > capacity {
            Self {
                reallocate: true,
                capacity: len,
            }
        } else {
            Self {
                reallocate: false,
                capacity,
            }
        }
    }
}

impl PointBufferSet {
    /// Creates buffers sized for the given cloud (at least one point of
    /// capacity, so empty clouds still produce valid bindings).
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        cloud: &PointCloud,
    ) -> Self {
        let capacity = cloud.len().max(1);
        let position_buffer = create_storage_buffer(
            device,
            &pack_positions(&cloud.positions, capacity),
            Some("point positions"),
        );
        let color_buffer = create_storage_buffer(
            device,
            &pack_colors(&cloud.colors, capacity),
            Some("point colors"),
        );
        let uniform_buffer =
            create_uniform_buffer(device, &PointUniforms::default(), Some("point uniforms"));
        let bind_group = create_bind_group(
            device,
            layout,
            &uniform_buffer,
            &position_buffer,
            &color_buffer,
        );

        Self {
            position_buffer,
            color_buffer,
            uniform_buffer,
            bind_group,
            capacity,
            len: cloud.len() as u32,
        }
    }

    /// Commits a point cloud to the device.
    ///
    /// Grow-only: reallocates (and rebuilds the bind group) only when the
    /// cloud exceeds the current capacity, otherwise overwrites in place.
    pub fn commit(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        cloud: &PointCloud,
    ) {
        let plan = CommitPlan::for_size(self.capacity, cloud.len());
        if plan.reallocate {
            self.capacity = plan.capacity;
            self.position_buffer = create_storage_buffer(
                device,
                &pack_positions(&cloud.positions, self.capacity),
                Some("point positions"),
            );
            self.color_buffer = create_storage_buffer(
                device,
                &pack_colors(&cloud.colors, self.capacity),
                Some("point colors"),
            );
            self.bind_group = create_bind_group(
                device,
                layout,
                &self.uniform_buffer,
                &self.position_buffer,
                &self.color_buffer,
            );
            log::debug!("point buffers reallocated for {} points", self.capacity);
        } else if !cloud.is_empty() {
            update_buffer(
                queue,
                &self.position_buffer,
                &pack_positions(&cloud.positions, cloud.len()),
            );
            update_buffer(
                queue,
                &self.color_buffer,
                &pack_colors(&cloud.colors, cloud.len()),
            );
        }
        self.len = cloud.len() as u32;
    }

    /// Returns the number of points last committed.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Returns true when no points are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the allocated point capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the bind group for drawing.
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Returns the per-draw uniform buffer.
    #[must_use]
    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    position_buffer: &wgpu::Buffer,
    color_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("point bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: position_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: color_buffer.as_entire_binding(),
            },
        ],
    })
}

/// Flattens positions to vec4-aligned floats, zero-padded to `capacity`.
fn pack_positions(positions: &[Vec3], capacity: usize) -> Vec<f32> {
    let mut data: Vec<f32> = positions
        .iter()
        .flat_map(|p| [p.x, p.y, p.z, 0.0])
        .collect();
    data.resize(capacity.max(positions.len()) * 4, 0.0);
    data
}

/// Flattens colors to floats, zero-padded to `capacity`.
fn pack_colors(colors: &[Vec4], capacity: usize) -> Vec<f32> {
    let mut data: Vec<f32> = colors.iter().flat_map(Vec4::to_array).collect();
    data.resize(capacity.max(colors.len()) * 4, 0.0);
    data
}
