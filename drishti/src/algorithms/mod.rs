//! Point-cloud processing algorithms.
//!
//! - [`aggregation`]: merge drained frames and voxel-downsample
//! - [`segmentation`]: RANSAC plane fitting and support-surface removal

pub mod aggregation;
pub mod segmentation;

pub use aggregation::FrameAggregator;
pub use segmentation::{PlaneParams, RansacPlaneConfig, SurfaceRemover};
