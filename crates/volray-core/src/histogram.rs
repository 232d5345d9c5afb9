//! Intensity histogram over a volume's sample domain.

use crate::volume::{SampleFormat, Volume};

/// An intensity distribution derived from a [`Volume`].
///
/// 8-bit volumes always bin 1:1 into 256 bins; 16-bit volumes are reduced
/// into the requested bin count because the native range is too large for
/// per-value binning. Raw counts are the source of truth; a peak-normalized
/// view is provided for display upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u32>,
    total: u64,
}

impl Histogram {
    /// Computes the histogram for a volume in a single scan.
    ///
    /// `reduced_bins` applies only to 16-bit volumes; 8-bit volumes use
    /// their native 256 bins. A degenerate all-zero volume produces all
    /// counts in bin 0, never an error.
    #[must_use]
    pub fn compute(volume: &Volume, reduced_bins: usize) -> Self {
        let format = volume.format();
        let bin_count = match format {
            SampleFormat::U8 => format.native_bins(),
            SampleFormat::U16 => reduced_bins.max(1),
        };

        let mut bins = vec![0u32; bin_count];
        let mut total = 0u64;
        for value in volume.samples() {
            bins[format.bin_index(value, bin_count)] += 1;
            total += 1;
        }

        log::debug!("histogram computed: {bin_count} bins over {total} voxels");
        Self { bins, total }
    }

    /// Returns the bin counts.
    #[must_use]
    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    /// Returns the number of bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Returns the total number of counted voxels.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Returns bin heights normalized so the tallest bin is 1.0.
    ///
    /// A histogram whose bins are all zero yields all zeros.
    #[must_use]
    pub fn normalized(&self) -> Vec<f32> {
        let peak = self.bins.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            return vec![0.0; self.bins.len()];
        }
        self.bins
            .iter()
            .map(|&c| c as f32 / peak as f32)
            .collect()
    }
}
