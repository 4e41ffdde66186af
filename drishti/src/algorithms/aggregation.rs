//! Frame aggregation.
//!
//! Merges every frame drained in one tick into a single cloud and thins it
//! with the centroid voxel grid.

use crate::core::types::PointCloud;
use crate::core::units::mm_to_m;
use crate::sensors::preprocessing::{CloudFilter, VoxelGrid};

/// Merges drained frames and downsamples the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameAggregator;

impl FrameAggregator {
    /// Create an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Concatenate frames in drain order.
    ///
    /// The merged cloud takes the header of the first (oldest) frame. An
    /// empty input gives an empty cloud with a default header; the
    /// recognition loop never calls this with no frames.
    pub fn aggregate(&self, frames: Vec<PointCloud>) -> PointCloud {
        let total: usize = frames.iter().map(PointCloud::len).sum();
        let mut frames = frames.into_iter();

        let Some(mut merged) = frames.next() else {
            return PointCloud::default();
        };
        merged.points.reserve(total - merged.len());
        for frame in frames {
            merged.points.extend(frame.points);
        }
        merged
    }

    /// Voxel-grid downsample with a cell edge given in millimetres.
    pub fn downsample(&self, cloud: &PointCloud, voxel_size_mm: f64) -> PointCloud {
        VoxelGrid::with_leaf_size(mm_to_m(voxel_size_mm) as f32).filter(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FrameHeader, PointXYZRGB};

    fn frame(stamp_us: u64, xs: &[f32]) -> PointCloud {
        PointCloud::from_points(
            FrameHeader::new(stamp_us, format!("/cam{stamp_us}")),
            xs.iter().map(|&x| PointXYZRGB::new(x, 0.0, 1.0)).collect(),
        )
    }

    #[test]
    fn test_aggregate_concatenates_in_order() {
        let merged = FrameAggregator::new().aggregate(vec![
            frame(10, &[1.0, 2.0]),
            frame(20, &[3.0]),
            frame(30, &[4.0, 5.0]),
        ]);

        assert_eq!(merged.header, FrameHeader::new(10, "/cam10"));
        let xs: Vec<f32> = merged.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(FrameAggregator::new().aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn test_downsample_uses_millimetres() {
        // Two points 1 mm apart share a 125 mm cell; a third sits in the next cell
        let cloud = frame(1, &[0.001, 0.002, 0.2]);
        let down = FrameAggregator::new().downsample(&cloud, 125.0);
        assert_eq!(down.len(), 2);
        assert_eq!(down.header, cloud.header);
    }
}
