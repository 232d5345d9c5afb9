//! Structure trait and render-context seam.
//!
//! A [`Structure`] is a scene-graph entity: something with a name, a local
//! transform, visibility, and refreshable derived state. The scene graph
//! itself (transform composition, traversal) lives outside this workspace;
//! this trait is the narrow interface it consumes.

use glam::{Mat4, Vec3};

/// A renderable entity positioned by an external scene graph.
pub trait Structure: Send + Sync {
    /// Returns the unique name of this structure.
    fn name(&self) -> &str;

    /// Returns the type name of this structure (e.g., "`RaycastVolume`").
    fn type_name(&self) -> &'static str;

    /// Returns the axis-aligned bounding box in local coordinates, or
    /// `None` if the structure has no spatial extent.
    fn bounding_box(&self) -> Option<(Vec3, Vec3)>;

    /// Returns a characteristic length scale for this structure.
    fn length_scale(&self) -> f32 {
        self.bounding_box()
            .map_or(1.0, |(min, max)| (max - min).length())
    }

    /// Returns the current local transform matrix.
    fn transform(&self) -> Mat4;

    /// Sets the local transform matrix.
    fn set_transform(&mut self, transform: Mat4);

    /// Returns whether this structure is currently visible.
    fn is_enabled(&self) -> bool;

    /// Sets the visibility of this structure.
    fn set_enabled(&mut self, enabled: bool);

    /// Invalidates derived state after data changes.
    fn refresh(&mut self);

    /// Resets the transform to identity.
    fn reset_transform(&mut self) {
        self.set_transform(Mat4::IDENTITY);
    }
}

/// Per-draw uniforms for point rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct PointUniforms {
    /// Combined projection * view matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Combined parent * local model matrix.
    pub model: [[f32; 4]; 4],
    /// Rendered point radius.
    pub point_radius: f32,
    pub _padding: [f32; 3],
}

impl Default for PointUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            point_radius: 0.01,
            _padding: [0.0; 3],
        }
    }
}

/// The draw-call boundary a structure renders through.
///
/// The wgpu implementation wraps a live render pass; tests substitute a
/// recording mock to observe draw behavior without a device.
pub trait RenderContext {
    /// Uploads per-draw point uniforms.
    fn upload_point_uniforms(&mut self, uniforms: PointUniforms);

    /// Issues one draw covering `count` points.
    fn draw_points(&mut self, count: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_uniforms_default_is_identity() {
        let u = PointUniforms::default();
        assert_eq!(u.view_proj, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_point_uniforms_is_pod() {
        let u = PointUniforms::default();
        let bytes: &[u8] = bytemuck::bytes_of(&u);
        // two mat4 + radius + padding, 16-byte aligned
        assert_eq!(bytes.len(), 144);
    }
}
