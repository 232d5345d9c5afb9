//! Point sampling: turning a volume plus transfer function into a colored
//! point cloud.
//!
//! The sampling strategy is a stratified per-axis grid: each axis gets a
//! step count proportional to its extent so strata stay roughly cubical and
//! the total number of strata approximates the requested sample count. When
//! the requested count reaches the voxel count the grid collapses to exactly
//! one sample per voxel center. With perturbation off the output is fully
//! deterministic; perturbation adds a uniform jitter inside each sample's
//! local cell to the emitted positions only.

use glam::{UVec3, Vec3, Vec4};
use rand::Rng;

use crate::transfer::TransferFunction;
use crate::volume::Volume;

/// Parameters controlling point sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    /// Requested number of sample positions (approximate above one-per-voxel
    /// density, exact per-voxel at or beyond it).
    pub sample_count: usize,
    /// Trilinear interpolation when true, nearest-sample otherwise.
    pub interpolate: bool,
    /// Jitter emitted positions within their local cell.
    pub perturbation: bool,
    /// Samples whose mapped opacity is at or below this are discarded.
    pub opacity_threshold: f32,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            sample_count: 1 << 16,
            interpolate: true,
            perturbation: false,
            opacity_threshold: 1.0 / 255.0,
        }
    }
}

/// A colored point cloud in volume-local space.
///
/// Positions and colors are parallel sequences of equal length. The volume
/// is centered at the origin with its longest axis normalized to length 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// Point positions.
    pub positions: Vec<Vec3>,
    /// Per-point RGBA colors.
    pub colors: Vec<Vec4>,
}

impl PointCloud {
    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true when the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Derives a point cloud from a volume and transfer function.
///
/// An unset transfer function falls back to the passthrough mapping. A zero
/// sample count yields an empty cloud.
#[must_use]
pub fn sample_volume(
    volume: &Volume,
    transfer: Option<&TransferFunction>,
    settings: &SamplerSettings,
) -> PointCloud {
    if settings.sample_count == 0 {
        return PointCloud::default();
    }

    let passthrough;
    let transfer = match transfer {
        Some(tf) => tf,
        None => {
            passthrough = TransferFunction::passthrough();
            &passthrough
        }
    };

    let dims = volume.dims();
    let steps = stratum_steps(dims, settings.sample_count);
    let extent = dims.as_vec3();
    let local_scale = 1.0 / extent.max_element();

    let mut rng = settings.perturbation.then(rand::thread_rng);

    let mut cloud = PointCloud::default();
    for k in 0..steps.z {
        for j in 0..steps.y {
            for i in 0..steps.x {
                let center = Vec3::new(
                    stratum_center(i, steps.x, dims.x),
                    stratum_center(j, steps.y, dims.y),
                    stratum_center(k, steps.z, dims.z),
                );

                let value = if settings.interpolate {
                    volume.sample_trilinear(center)
                } else {
                    volume.sample_nearest(center)
                };

                let color = transfer.sample(value);
                if color.w <= settings.opacity_threshold {
                    continue;
                }

                // Jitter only the emitted position; the color stays tied to
                // the unperturbed sample so toggling jitter never recolors.
                let mut p = center;
                if let Some(rng) = &mut rng {
                    p += Vec3::new(
                        rng.gen_range(-0.5..0.5),
                        rng.gen_range(-0.5..0.5),
                        rng.gen_range(-0.5..0.5),
                    );
                    p = p.clamp(Vec3::ZERO, (extent - Vec3::ONE).max(Vec3::ZERO));
                }

                cloud
                    .positions
                    .push((p + Vec3::splat(0.5) - extent * 0.5) * local_scale);
                cloud.colors.push(color);
            }
        }
    }

    log::debug!(
        "sampled {} points ({} strata requested, interpolate={}, perturbation={})",
        cloud.len(),
        settings.sample_count,
        settings.interpolate,
        settings.perturbation
    );
    cloud
}

/// Picks per-axis step counts whose product approximates `sample_count`,
/// capped at one stratum per voxel.
fn stratum_steps(dims: UVec3, sample_count: usize) -> UVec3 {
    let total = u64::from(dims.x) * u64::from(dims.y) * u64::from(dims.z);
    if sample_count as u64 >= total {
        return dims;
    }
    let scale = (sample_count as f64 / total as f64).cbrt();
    let step = |d: u32| (((f64::from(d) * scale).round().max(1.0)) as u32).min(d);
    UVec3::new(step(dims.x), step(dims.y), step(dims.z))
}

/// Continuous node coordinate of stratum `i` of `steps` along an axis of
/// `dim` voxels. Exact voxel centers when steps == dim.
fn stratum_center(i: u32, steps: u32, dim: u32) -> f32 {
    if steps == dim {
        i as f32
    } else {
        (i as f32 + 0.5) * dim as f32 / steps as f32 - 0.5
    }
}
