//! Raw scalar volume storage.
//!
//! A [`Volume`] is an immutable-after-load 3D grid of unsigned scalar
//! samples, addressed as `x + y * width + z * width * height`. The sample
//! domain (8-bit or 16-bit) is described by [`SampleFormat`], which also
//! carries the histogram binning strategy for that domain.

use std::path::Path;

use glam::{UVec3, Vec3};

use crate::error::{Result, VolrayError};

/// The sample domain of a volume: bytes per sample, value range, and the
/// bin-scaling function used when histogramming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned 8-bit samples.
    U8,
    /// Unsigned 16-bit samples, little-endian.
    U16,
}

impl SampleFormat {
    /// Returns the number of bytes per sample (1 or 2).
    #[must_use]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
        }
    }

    /// Returns the number of representable sample values.
    #[must_use]
    pub fn sample_range(self) -> u32 {
        match self {
            SampleFormat::U8 => 1 << 8,
            SampleFormat::U16 => 1 << 16,
        }
    }

    /// Returns the largest representable sample value.
    #[must_use]
    pub fn max_value(self) -> u32 {
        self.sample_range() - 1
    }

    /// Returns the natural histogram bin count for this domain.
    ///
    /// 8-bit samples bin 1:1 into 256 bins. 16-bit samples have no natural
    /// reduced count; callers pick one (see `Options::histogram_bins`).
    #[must_use]
    pub fn native_bins(self) -> usize {
        match self {
            SampleFormat::U8 => 256,
            SampleFormat::U16 => 1 << 16,
        }
    }

    /// Maps a raw sample value into one of `bin_count` histogram bins.
    ///
    /// Uses `value * bin_count / sample_range`, which is the identity for
    /// the 8-bit/256-bin path and an even integer reduction for 16-bit
    /// domains. The result is clamped to the last bin.
    #[must_use]
    pub fn bin_index(self, value: u32, bin_count: usize) -> usize {
        debug_assert!(bin_count > 0);
        let idx = (u64::from(value) * bin_count as u64) / u64::from(self.sample_range());
        (idx as usize).min(bin_count - 1)
    }

    /// Constructs a format from a bytes-per-sample count.
    #[must_use]
    pub fn from_bytes_per_sample(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(SampleFormat::U8),
            2 => Some(SampleFormat::U16),
            _ => None,
        }
    }
}

/// An immutable 3D grid of scalar samples.
pub struct Volume {
    dims: UVec3,
    format: SampleFormat,
    data: Vec<u8>,
}

impl Volume {
    /// Creates a volume from an in-memory byte buffer.
    ///
    /// Fails when any dimension is zero or the buffer length disagrees with
    /// `width * height * depth * bytes_per_sample`.
    pub fn from_bytes(data: Vec<u8>, dims: UVec3, format: SampleFormat) -> Result<Self> {
        if dims.x == 0 || dims.y == 0 || dims.z == 0 {
            return Err(VolrayError::EmptyDimensions(dims.x, dims.y, dims.z));
        }
        let expected =
            dims.x as usize * dims.y as usize * dims.z as usize * format.bytes_per_sample();
        if data.len() != expected {
            return Err(VolrayError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dims, format, data })
    }

    /// Loads a raw volume from a file.
    ///
    /// The file must contain exactly the declared number of sample bytes,
    /// x-fastest, 16-bit samples little-endian.
    pub fn from_file(path: impl AsRef<Path>, dims: UVec3, format: SampleFormat) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let volume = Self::from_bytes(data, dims, format)?;
        log::info!(
            "loaded volume {} ({}x{}x{}, {} bytes/sample)",
            path.display(),
            dims.x,
            dims.y,
            dims.z,
            format.bytes_per_sample()
        );
        Ok(volume)
    }

    /// Returns the grid dimensions.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the sample format.
    #[must_use]
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Returns the raw sample bytes.
    #[must_use]
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the total number of voxels.
    #[must_use]
    pub fn num_voxels(&self) -> u64 {
        u64::from(self.dims.x) * u64::from(self.dims.y) * u64::from(self.dims.z)
    }

    /// Flattens a 3D voxel index to a linear sample index.
    #[must_use]
    pub fn flatten_index(&self, x: u32, y: u32, z: u32) -> usize {
        x as usize
            + y as usize * self.dims.x as usize
            + z as usize * self.dims.x as usize * self.dims.y as usize
    }

    /// Returns the raw value of the voxel at the given index.
    ///
    /// Indices are clamped to the grid bounds.
    #[must_use]
    pub fn voxel(&self, x: u32, y: u32, z: u32) -> u32 {
        let x = x.min(self.dims.x - 1);
        let y = y.min(self.dims.y - 1);
        let z = z.min(self.dims.z - 1);
        let idx = self.flatten_index(x, y, z);
        match self.format {
            SampleFormat::U8 => u32::from(self.data[idx]),
            SampleFormat::U16 => {
                let b = idx * 2;
                u32::from(u16::from_le_bytes([self.data[b], self.data[b + 1]]))
            }
        }
    }

    /// Returns the voxel value normalized into [0, 1].
    #[must_use]
    pub fn voxel_norm(&self, x: u32, y: u32, z: u32) -> f32 {
        self.voxel(x, y, z) as f32 / self.format.max_value() as f32
    }

    /// Iterates over all raw sample values in storage order.
    pub fn samples(&self) -> impl Iterator<Item = u32> + '_ {
        let bytes = self.format.bytes_per_sample();
        self.data.chunks_exact(bytes).map(|chunk| {
            if chunk.len() == 2 {
                u32::from(u16::from_le_bytes([chunk[0], chunk[1]]))
            } else {
                u32::from(chunk[0])
            }
        })
    }

    /// Samples the normalized value nearest to a continuous grid position.
    ///
    /// `p` is in node coordinates: voxel centers sit at integer positions
    /// `0..dim-1` per axis. Out-of-range positions are clamped.
    #[must_use]
    pub fn sample_nearest(&self, p: Vec3) -> f32 {
        let p = self.clamp_to_grid(p);
        self.voxel_norm(
            (p.x + 0.5) as u32,
            (p.y + 0.5) as u32,
            (p.z + 0.5) as u32,
        )
    }

    /// Samples the normalized value at a continuous grid position with
    /// trilinear interpolation between the eight surrounding voxels.
    #[must_use]
    pub fn sample_trilinear(&self, p: Vec3) -> f32 {
        let p = self.clamp_to_grid(p);
        let base = p.floor();
        let frac = p - base;

        let x0 = base.x as u32;
        let y0 = base.y as u32;
        let z0 = base.z as u32;
        let x1 = (x0 + 1).min(self.dims.x - 1);
        let y1 = (y0 + 1).min(self.dims.y - 1);
        let z1 = (z0 + 1).min(self.dims.z - 1);

        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;

        let c00 = lerp(self.voxel_norm(x0, y0, z0), self.voxel_norm(x1, y0, z0), frac.x);
        let c10 = lerp(self.voxel_norm(x0, y1, z0), self.voxel_norm(x1, y1, z0), frac.x);
        let c01 = lerp(self.voxel_norm(x0, y0, z1), self.voxel_norm(x1, y0, z1), frac.x);
        let c11 = lerp(self.voxel_norm(x0, y1, z1), self.voxel_norm(x1, y1, z1), frac.x);

        let c0 = lerp(c00, c10, frac.y);
        let c1 = lerp(c01, c11, frac.y);
        lerp(c0, c1, frac.z)
    }

    fn clamp_to_grid(&self, p: Vec3) -> Vec3 {
        let max = (self.dims.as_vec3() - Vec3::ONE).max(Vec3::ZERO);
        p.clamp(Vec3::ZERO, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_volume() -> Volume {
        // 4x1x1, values 0, 64, 128, 192
        Volume::from_bytes(vec![0, 64, 128, 192], UVec3::new(4, 1, 1), SampleFormat::U8).unwrap()
    }

    #[test]
    fn test_from_bytes_size_mismatch() {
        let err = Volume::from_bytes(vec![0; 7], UVec3::new(2, 2, 2), SampleFormat::U8);
        assert!(matches!(
            err,
            Err(VolrayError::SizeMismatch {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_from_bytes_empty_dimensions() {
        let err = Volume::from_bytes(vec![], UVec3::new(0, 2, 2), SampleFormat::U8);
        assert!(matches!(err, Err(VolrayError::EmptyDimensions(0, 2, 2))));
    }

    #[test]
    fn test_buffer_length_accounts_for_sample_width() {
        let vol =
            Volume::from_bytes(vec![0; 2 * 2 * 2 * 2], UVec3::new(2, 2, 2), SampleFormat::U16)
                .unwrap();
        assert_eq!(vol.num_voxels(), 8);
        assert_eq!(vol.raw_data().len(), 16);

        let err = Volume::from_bytes(vec![0; 8], UVec3::new(2, 2, 2), SampleFormat::U16);
        assert!(matches!(err, Err(VolrayError::SizeMismatch { .. })));
    }

    #[test]
    fn test_u16_little_endian_decoding() {
        let vol = Volume::from_bytes(
            vec![0x34, 0x12, 0xff, 0xff],
            UVec3::new(2, 1, 1),
            SampleFormat::U16,
        )
        .unwrap();
        assert_eq!(vol.voxel(0, 0, 0), 0x1234);
        assert_eq!(vol.voxel(1, 0, 0), 0xffff);
        assert_eq!(vol.samples().collect::<Vec<_>>(), vec![0x1234, 0xffff]);
    }

    #[test]
    fn test_bin_index_identity_for_u8() {
        for v in 0..256 {
            assert_eq!(SampleFormat::U8.bin_index(v, 256), v as usize);
        }
    }

    #[test]
    fn test_bin_index_reduces_u16() {
        assert_eq!(SampleFormat::U16.bin_index(0, 512), 0);
        assert_eq!(SampleFormat::U16.bin_index(127, 512), 0);
        assert_eq!(SampleFormat::U16.bin_index(128, 512), 1);
        assert_eq!(SampleFormat::U16.bin_index(65535, 512), 511);
    }

    #[test]
    fn test_sample_nearest_at_centers() {
        let vol = gradient_volume();
        assert!((vol.sample_nearest(Vec3::new(2.0, 0.0, 0.0)) - 128.0 / 255.0).abs() < 1e-6);
        // 2.4 rounds to voxel 2, 2.6 to voxel 3
        assert!((vol.sample_nearest(Vec3::new(2.4, 0.0, 0.0)) - 128.0 / 255.0).abs() < 1e-6);
        assert!((vol.sample_nearest(Vec3::new(2.6, 0.0, 0.0)) - 192.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_trilinear_midpoint() {
        let vol = gradient_volume();
        let mid = vol.sample_trilinear(Vec3::new(1.5, 0.0, 0.0));
        let expected = (64.0 + 128.0) / 2.0 / 255.0;
        assert!((mid - expected).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let vol = gradient_volume();
        assert!((vol.sample_trilinear(Vec3::new(10.0, 0.0, 0.0)) - 192.0 / 255.0).abs() < 1e-6);
        assert!((vol.sample_nearest(Vec3::new(-3.0, 0.0, 0.0)) - 0.0).abs() < 1e-6);
    }
}
