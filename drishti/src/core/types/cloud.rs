//! Point cloud and frame header.

use serde::{Deserialize, Serialize};

use super::point::PointXYZRGB;

/// Capture time and coordinate frame of a cloud.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Capture timestamp in microseconds since epoch
    pub stamp_us: u64,
    /// Coordinate frame identifier (e.g. "/camera_depth_optical_frame")
    pub frame_id: String,
}

impl FrameHeader {
    /// Create a header.
    pub fn new(stamp_us: u64, frame_id: impl Into<String>) -> Self {
        Self {
            stamp_us,
            frame_id: frame_id.into(),
        }
    }
}

/// Ordered collection of 3D points sharing one header.
///
/// A frame handed to the buffer is a `PointCloud`; so is the per-tick
/// aggregated cloud and the foreground set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud {
    pub header: FrameHeader,
    pub points: Vec<PointXYZRGB>,
}

impl PointCloud {
    /// Create an empty cloud with the given header.
    pub fn new(header: FrameHeader) -> Self {
        Self {
            header,
            points: Vec::new(),
        }
    }

    /// Create an empty cloud with pre-allocated capacity.
    pub fn with_capacity(header: FrameHeader, capacity: usize) -> Self {
        Self {
            header,
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a cloud from existing points.
    pub fn from_points(header: FrameHeader, points: Vec<PointXYZRGB>) -> Self {
        Self { header, points }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point.
    #[inline]
    pub fn push(&mut self, point: PointXYZRGB) {
        self.points.push(point);
    }

    /// Iterate over points.
    pub fn iter(&self) -> impl Iterator<Item = &PointXYZRGB> {
        self.points.iter()
    }
}
