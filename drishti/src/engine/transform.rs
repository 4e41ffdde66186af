//! Coordinate-frame transform lookup.

use std::collections::HashMap;

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Source of frame-to-frame transforms.
pub trait TransformLookup: Send + Sync {
    /// Transform that maps coordinates expressed in `source_frame` into
    /// `target`, valid at `stamp_us`.
    fn lookup(&self, target: &str, source_frame: &str, stamp_us: u64) -> Result<Isometry3<f64>>;
}

/// One fixed parent/child transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTransformConfig {
    pub parent: String,
    pub child: String,
    /// Child origin in the parent frame (metres)
    #[serde(default)]
    pub translation: [f64; 3],
    /// Child orientation in the parent frame as `[x, y, z, w]`
    #[serde(default = "identity_quaternion")]
    pub rotation: [f64; 4],
}

fn identity_quaternion() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl StaticTransformConfig {
    /// Transform mapping child coordinates into the parent frame.
    pub fn parent_from_child(&self) -> Isometry3<f64> {
        let [x, y, z, w] = self.rotation;
        let rotation = UnitQuaternion::new_normalize(Quaternion::new(w, x, y, z));
        let [tx, ty, tz] = self.translation;
        Isometry3::from_parts(Translation3::new(tx, ty, tz), rotation)
    }
}

/// Frame names compare without a leading slash ("/world" == "world").
fn normalize(frame: &str) -> &str {
    frame.strip_prefix('/').unwrap_or(frame)
}

/// Time-invariant transform tree built from configuration.
///
/// Each frame has at most one parent; a lookup walks both frames up to
/// their common root.
#[derive(Debug, Clone, Default)]
pub struct StaticTransforms {
    parents: HashMap<String, (String, Isometry3<f64>)>,
}

impl StaticTransforms {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured edges. Later edges replace earlier ones for
    /// the same child.
    pub fn from_configs(configs: &[StaticTransformConfig]) -> Self {
        let mut tree = Self::new();
        for c in configs {
            tree.insert(&c.parent, &c.child, c.parent_from_child());
        }
        tree
    }

    /// Add or replace the edge `parent <- child`.
    pub fn insert(&mut self, parent: &str, child: &str, parent_from_child: Isometry3<f64>) {
        self.parents.insert(
            normalize(child).to_string(),
            (normalize(parent).to_string(), parent_from_child),
        );
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if the tree has no edges.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Root of `frame` and the transform `root_from_frame`.
    fn to_root<'a>(&'a self, frame: &'a str) -> (&'a str, Isometry3<f64>) {
        let mut current = frame;
        let mut root_from_frame = Isometry3::identity();
        // Bounded walk; a cycle in the configuration cannot loop forever
        for _ in 0..=self.parents.len() {
            match self.parents.get(current) {
                Some((parent, parent_from_current)) => {
                    root_from_frame = parent_from_current * root_from_frame;
                    current = parent;
                }
                None => break,
            }
        }
        (current, root_from_frame)
    }
}

impl TransformLookup for StaticTransforms {
    fn lookup(&self, target: &str, source_frame: &str, _stamp_us: u64) -> Result<Isometry3<f64>> {
        let target_n = normalize(target);
        let source_n = normalize(source_frame);
        if target_n == source_n {
            return Ok(Isometry3::identity());
        }

        let (target_root, root_from_target) = self.to_root(target_n);
        let (source_root, root_from_source) = self.to_root(source_n);
        if target_root != source_root {
            return Err(Error::Transform {
                target: target.to_string(),
                source_frame: source_frame.to_string(),
                reason: format!("frames are not connected ({target_root} vs {source_root})"),
            });
        }

        Ok(root_from_target.inverse() * root_from_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    fn edge(parent: &str, child: &str, t: [f64; 3], yaw: f64) -> StaticTransformConfig {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw);
        StaticTransformConfig {
            parent: parent.into(),
            child: child.into(),
            translation: t,
            rotation: [q.i, q.j, q.k, q.w],
        }
    }

    #[test]
    fn test_same_frame_is_identity() {
        let tf = StaticTransforms::new();
        let iso = tf.lookup("/world", "world", 0).unwrap();
        assert_eq!(iso, Isometry3::identity());
    }

    #[test]
    fn test_direct_edge() {
        let tf = StaticTransforms::from_configs(&[edge("/world", "/camera", [1.0, 2.0, 3.0], 0.0)]);
        let iso = tf.lookup("/world", "/camera", 0).unwrap();
        let p = iso * Point3::origin();
        assert_relative_eq!(p.coords, Vector3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_chain_and_inverse() {
        let tf = StaticTransforms::from_configs(&[
            edge("world", "base", [1.0, 0.0, 0.0], FRAC_PI_2),
            edge("base", "camera", [0.0, 1.0, 0.0], 0.0),
        ]);

        let world_from_camera = tf.lookup("world", "camera", 0).unwrap();
        let p = world_from_camera * Point3::origin();
        // base rotated 90 deg: base +y is world -x
        assert_relative_eq!(p.coords, Vector3::new(0.0, 0.0, 0.0), epsilon = 1e-12);

        let camera_from_world = tf.lookup("camera", "world", 0).unwrap();
        let back = camera_from_world * p;
        assert_relative_eq!(back.coords, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_frame_fails() {
        let tf = StaticTransforms::from_configs(&[edge("world", "camera", [0.0; 3], 0.0)]);
        let err = tf.lookup("world", "lidar", 0).unwrap_err();
        assert!(matches!(err, Error::Transform { .. }));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut tf = StaticTransforms::new();
        tf.insert("a", "b", Isometry3::identity());
        tf.insert("b", "a", Isometry3::identity());
        // Either answer is acceptable; it just has to return
        let _ = tf.lookup("world", "a", 0);
    }
}
