//! The wgpu implementation of the core render-context seam.

use volray_core::{PointUniforms, RenderContext};

use crate::context::GpuContext;
use crate::point_buffers::PointBufferSet;

/// A live point-drawing pass over a `wgpu::RenderPass`.
///
/// Structures render through the `volray_core::RenderContext` trait; this
/// is the real device-backed implementation.
pub struct PointPass<'a, 'e> {
    queue: &'a wgpu::Queue,
    render_pass: &'a mut wgpu::RenderPass<'e>,
    buffers: &'a PointBufferSet,
}

impl<'a, 'e> PointPass<'a, 'e> {
    /// Begins a point pass: sets the point pipeline on the render pass.
    pub fn new(
        ctx: &'a GpuContext,
        render_pass: &'a mut wgpu::RenderPass<'e>,
        buffers: &'a PointBufferSet,
    ) -> Self {
        render_pass.set_pipeline(&ctx.point_pipeline);
        Self {
            queue: &ctx.queue,
            render_pass,
            buffers,
        }
    }
}

impl RenderContext for PointPass<'_, '_> {
    fn upload_point_uniforms(&mut self, uniforms: PointUniforms) {
        self.queue
            .write_buffer(self.buffers.uniform_buffer(), 0, bytemuck::bytes_of(&uniforms));
    }

    fn draw_points(&mut self, count: u32) {
        self.render_pass.set_bind_group(0, self.buffers.bind_group(), &[]);
        // 4-vertex triangle strip per point instance
        self.render_pass.draw(0..4, 0..count);
    }
}
