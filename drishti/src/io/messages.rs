//! Outbound message types.
//!
//! Shapes follow the usual robotics conventions: a recognised-object list
//! with one shared header, and a marker array with one mesh marker per
//! detection. All types serialise to JSON for the line sink.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::types::Pose3D;

// ============================================================================
// Common
// ============================================================================

/// Message header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MsgHeader {
    /// Timestamp in microseconds.
    pub stamp_us: u64,
    /// Coordinate frame of the payload.
    pub frame_id: String,
}

/// Pose as position plus `(x, y, z, w)` quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseMsg {
    pub position: [f64; 3],
    pub orientation: [f64; 4],
}

impl From<&Pose3D> for PoseMsg {
    fn from(pose: &Pose3D) -> Self {
        let q = pose.orientation.quaternion();
        Self {
            position: [pose.position.x, pose.position.y, pose.position.z],
            orientation: [q.i, q.j, q.k, q.w],
        }
    }
}

// ============================================================================
// Recognised objects
// ============================================================================

/// One recognised object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedObject {
    pub header: MsgHeader,
    pub label: String,
    pub confidence: f64,
    pub pose: PoseMsg,
}

/// All objects recognised in one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognizedObjects {
    pub header: MsgHeader,
    pub objects: Vec<RecognizedObject>,
}

// ============================================================================
// Visualization markers
// ============================================================================

/// Marker namespace for recognised objects.
pub const MARKER_NAMESPACE: &str = "objrec";

/// Uniform marker scale: meshes are modelled in millimetres.
pub const MARKER_SCALE: f64 = 0.001;

/// Translucent marker colour `(r, g, b, a)`.
pub const MARKER_COLOR: ColorRgba = ColorRgba {
    r: 1.0,
    g: 0.1,
    b: 0.3,
    a: 0.75,
};

/// RGBA colour with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Marker geometry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerType {
    MeshResource,
}

/// Marker action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerAction {
    Add,
}

/// One visualization marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub header: MsgHeader,
    pub ns: String,
    /// Index within the publishing call, starting at 0
    pub id: u32,
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    pub action: MarkerAction,
    pub pose: PoseMsg,
    pub scale: [f64; 3],
    pub color: ColorRgba,
    /// Time after which the marker disappears unless refreshed
    pub lifetime: Duration,
    pub mesh_resource: String,
    pub mesh_use_embedded_materials: bool,
}

/// Markers published together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}
