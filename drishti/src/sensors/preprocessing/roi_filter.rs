//! Axis-aligned region-of-interest clipping.
//!
//! Applied to every frame before it enters the buffer, which bounds buffered
//! memory regardless of sensor density.

use serde::{Deserialize, Serialize};

use crate::core::types::{PointCloud, PointXYZRGB};

/// Open interval `(min, max)` on one axis, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
}

impl AxisBounds {
    /// Create bounds.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Strict containment: both bounds are excluded. NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value > self.min && value < self.max
    }

    /// True when the interval can contain any value.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// Configuration for region-of-interest clipping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionOfInterestConfig {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl Default for RegionOfInterestConfig {
    /// Effectively unbounded (±1 km).
    fn default() -> Self {
        Self {
            x_min: -1000.0,
            x_max: 1000.0,
            y_min: -1000.0,
            y_max: 1000.0,
            z_min: -1000.0,
            z_max: 1000.0,
        }
    }
}

impl RegionOfInterestConfig {
    /// Per-axis bounds as `[x, y, z]`.
    pub fn axes(&self) -> [AxisBounds; 3] {
        [
            AxisBounds::new(self.x_min, self.x_max),
            AxisBounds::new(self.y_min, self.y_max),
            AxisBounds::new(self.z_min, self.z_max),
        ]
    }
}

/// Region-of-interest filter.
///
/// A point is kept only when it lies strictly inside all three axis
/// intervals.
#[derive(Debug, Clone)]
pub struct RegionOfInterest {
    x: AxisBounds,
    y: AxisBounds,
    z: AxisBounds,
}

impl RegionOfInterest {
    /// Create a filter with the given configuration.
    pub fn new(config: RegionOfInterestConfig) -> Self {
        let [x, y, z] = config.axes();
        Self { x, y, z }
    }

    /// Check whether a point is inside the region.
    #[inline]
    pub fn contains(&self, p: &PointXYZRGB) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Apply clipping, preserving point order and header.
    pub fn apply(&self, cloud: &PointCloud) -> PointCloud {
        let points = cloud
            .points
            .iter()
            .filter(|p| self.contains(p))
            .copied()
            .collect();
        PointCloud::from_points(cloud.header.clone(), points)
    }
}

impl Default for RegionOfInterest {
    fn default() -> Self {
        Self::new(RegionOfInterestConfig::default())
    }
}
