//! Transfer functions mapping intensity to color and opacity.

use glam::Vec4;

/// A 1D transfer function: RGBA stops evenly spaced over [0, 1].
///
/// Owned by the caller and shared into the renderer; the renderer only ever
/// reads it. An absent transfer function means the passthrough mapping.
#[derive(Debug, Clone)]
pub struct TransferFunction {
    stops: Vec<Vec4>,
}

impl TransferFunction {
    /// Creates a transfer function from RGBA stops.
    #[must_use]
    pub fn new(stops: Vec<Vec4>) -> Self {
        Self { stops }
    }

    /// The passthrough mapping: gray level and opacity both equal the
    /// intensity, so dark voxels fade out.
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new(vec![Vec4::ZERO, Vec4::ONE])
    }

    /// A fully opaque grayscale ramp (opacity 1 at every intensity).
    #[must_use]
    pub fn opaque_grayscale() -> Self {
        Self::new(vec![
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 1.0, 1.0, 1.0),
        ])
    }

    /// Returns the RGBA stops.
    #[must_use]
    pub fn stops(&self) -> &[Vec4] {
        &self.stops
    }

    /// Samples the transfer function at a normalized intensity.
    #[must_use]
    pub fn sample(&self, t: f32) -> Vec4 {
        let t = t.clamp(0.0, 1.0);

        if self.stops.is_empty() {
            return Vec4::ZERO;
        }

        if self.stops.len() == 1 {
            return self.stops[0];
        }

        let n = self.stops.len() - 1;
        let idx = (t * n as f32).floor() as usize;
        let idx = idx.min(n - 1);
        let frac = t * n as f32 - idx as f32;

        self.stops[idx].lerp(self.stops[idx + 1], frac)
    }

    /// Resamples the function into `width` RGBA8 texels for GPU upload.
    #[must_use]
    pub fn to_rgba8(&self, width: usize) -> Vec<u8> {
        let width = width.max(1);
        let mut texels = Vec::with_capacity(width * 4);
        for i in 0..width {
            let t = if width == 1 {
                0.0
            } else {
                i as f32 / (width - 1) as f32
            };
            let c = self.sample(t).clamp(Vec4::ZERO, Vec4::ONE);
            texels.push((c.x * 255.0).round() as u8);
            texels.push((c.y * 255.0).round() as u8);
            texels.push((c.z * 255.0).round() as u8);
            texels.push((c.w * 255.0).round() as u8);
        }
        texels
    }
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self::passthrough()
    }
}
