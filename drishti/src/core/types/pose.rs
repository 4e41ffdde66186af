//! Pose types.

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::core::units::mm_to_m;

/// Rigid pose in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose3D {
    /// Translation in metres
    pub position: Vector3<f64>,
    /// Orientation
    pub orientation: UnitQuaternion<f64>,
}

impl Pose3D {
    /// Create a pose from translation and orientation.
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Identity pose.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// As an isometry (for composing with frame transforms).
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    /// From an isometry.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self {
            position: iso.translation.vector,
            orientation: iso.rotation,
        }
    }

    /// Express this pose in another frame, given the transform from this
    /// pose's frame into the target frame.
    pub fn transformed_by(&self, target_from_source: &Isometry3<f64>) -> Self {
        Self::from_isometry(&(target_from_source * self.to_isometry()))
    }
}

impl Default for Pose3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Raw rigid transform reported by the recognition engine.
///
/// Laid out as the engine emits it: a row-major 3x3 rotation followed by
/// a translation in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Matrix3<f64>,
    pub translation_mm: Vector3<f64>,
}

impl RigidTransform {
    /// Build from the engine's flat 12-element array
    /// (`r00 r01 r02 r10 .. r22 tx ty tz`).
    pub fn from_row_major(array: &[f64; 12]) -> Self {
        Self {
            rotation: Matrix3::new(
                array[0], array[1], array[2], array[3], array[4], array[5], array[6], array[7],
                array[8],
            ),
            translation_mm: Vector3::new(array[9], array[10], array[11]),
        }
    }

    /// Convert to a metric pose.
    ///
    /// Translation is rescaled from millimetres to metres. The quaternion is
    /// renormalised, so slightly non-orthonormal engine output still yields
    /// a unit quaternion.
    pub fn to_pose(&self) -> Pose3D {
        let rotation = Rotation3::from_matrix_unchecked(self.rotation);
        let quaternion = UnitQuaternion::from_rotation_matrix(&rotation).into_inner();
        Pose3D {
            position: Vector3::new(
                mm_to_m(self.translation_mm.x),
                mm_to_m(self.translation_mm.y),
                mm_to_m(self.translation_mm.z),
            ),
            orientation: UnitQuaternion::new_normalize(quaternion),
        }
    }
}
