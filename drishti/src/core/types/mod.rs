//! Core data types for recognition operations.
//!
//! - [`PointXYZRGB`]: 3D point in metres with optional colour
//! - [`PointCloud`]: Ordered points plus a [`FrameHeader`]; a sensor frame is
//!   a `PointCloud` as delivered by the ingestion callback
//! - [`Pose3D`]: Rigid pose (translation + unit quaternion)
//! - [`RigidTransform`]: Raw 3x3 rotation + millimetre translation as produced
//!   by the recognition engine

mod cloud;
mod point;
mod pose;

pub use cloud::{FrameHeader, PointCloud};
pub use point::{PointXYZRGB, Rgb};
pub use pose::{Pose3D, RigidTransform};
