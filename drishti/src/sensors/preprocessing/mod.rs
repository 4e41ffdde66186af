//! Point cloud preprocessing.
//!
//! # Pipeline
//!
//! ```text
//! sensor frame → RegionOfInterest (at enqueue) → … aggregate … → VoxelGrid
//! ```
//!
//! Both filters are position-only: colour is carried through (clipped points
//! keep their colour, voxel centroids average the colours of their members).

mod roi_filter;
mod voxel_grid;

pub use roi_filter::{AxisBounds, RegionOfInterest, RegionOfInterestConfig};
pub use voxel_grid::{VoxelGrid, VoxelGridConfig};

use crate::core::types::PointCloud;

/// Trait for cloud filtering operations.
pub trait CloudFilter: Send + Sync {
    /// Apply the filter to a cloud, returning a new cloud with the same header.
    fn filter(&self, cloud: &PointCloud) -> PointCloud;

    /// Get the name of this filter for diagnostics.
    fn name(&self) -> &'static str;
}

impl CloudFilter for RegionOfInterest {
    fn filter(&self, cloud: &PointCloud) -> PointCloud {
        self.apply(cloud)
    }

    fn name(&self) -> &'static str {
        "RegionOfInterest"
    }
}

impl CloudFilter for VoxelGrid {
    fn filter(&self, cloud: &PointCloud) -> PointCloud {
        self.apply(cloud)
    }

    fn name(&self) -> &'static str {
        "VoxelGrid"
    }
}
