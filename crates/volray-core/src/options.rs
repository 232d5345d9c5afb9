//! Configuration options for volray.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable configuration for the volume rendering pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Reduced histogram bin count for 16-bit volumes (8-bit always uses
    /// its native 256 bins).
    pub histogram_bins: usize,

    /// Opacity at or below which sampled points are discarded.
    pub opacity_threshold: f32,

    /// Rendered point radius in clip-space units.
    pub point_radius: f32,

    /// Default sample count for newly created raycast volumes.
    pub default_sample_count: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            histogram_bins: 512,
            opacity_threshold: 1.0 / 255.0,
            point_radius: 0.01,
            default_sample_count: 1 << 16,
        }
    }
}

impl Options {
    /// Parses options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes options to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Saves options to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let options = Options {
            histogram_bins: 1024,
            opacity_threshold: 0.05,
            point_radius: 0.02,
            default_sample_count: 4096,
        };
        let json = options.to_json().unwrap();
        let parsed = Options::from_json(&json).unwrap();
        assert_eq!(options, parsed);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let parsed = Options::from_json(r#"{"histogram_bins": 128}"#).unwrap();
        assert_eq!(parsed.histogram_bins, 128);
        assert_eq!(parsed.opacity_threshold, Options::default().opacity_threshold);
    }
}
