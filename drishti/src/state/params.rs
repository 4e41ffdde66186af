//! Live-reconfigurable parameters.
//!
//! The recognition thread reads one [`RuntimeParams`] snapshot at the start
//! of each tick. Reconfiguration builds a complete new snapshot and swaps it
//! in under a write lock, so a tick sees either the old set or the new set.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::algorithms::segmentation::PlaneParams;
use crate::engine::EngineParams;
use crate::error::{Error, Result};
use crate::sensors::preprocessing::RegionOfInterestConfig;

/// Buffering, downsampling and output parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterfaceParams {
    /// Publish visualization markers
    pub publish_markers: bool,
    /// Frame buffer depth
    pub n_clouds_per_recognition: usize,
    /// Voxel edge for aggregation downsampling (millimetres)
    pub downsample_voxel_size: f64,
    /// Marker lifetime per unit of confidence (seconds)
    pub confidence_time_multiplier: f64,
}

impl Default for InterfaceParams {
    fn default() -> Self {
        Self {
            publish_markers: true,
            n_clouds_per_recognition: 1,
            downsample_voxel_size: 3.5,
            confidence_time_multiplier: 30.0,
        }
    }
}

/// Complete tunable parameter set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuntimeParams {
    pub engine: EngineParams,
    pub success_probability: f64,
    pub plane: PlaneParams,
    pub roi: RegionOfInterestConfig,
    pub interface: InterfaceParams,
}

impl RuntimeParams {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Config(msg));

        if !(self.success_probability > 0.0 && self.success_probability <= 1.0) {
            return fail(format!(
                "success_probability must be in (0, 1], got {}",
                self.success_probability
            ));
        }
        if self.engine.num_threads == 0 {
            return fail("num_threads must be at least 1".to_string());
        }
        for (name, value) in [
            ("object_visibility", self.engine.object_visibility),
            ("relative_object_size", self.engine.relative_object_size),
            (
                "relative_number_of_illegal_points",
                self.engine.relative_number_of_illegal_points,
            ),
            ("intersection_fraction", self.engine.intersection_fraction),
            ("rel_num_of_plane_points", self.plane.rel_num_of_plane_points),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{name} must be in [0, 1], got {value}"));
            }
        }
        if !(self.plane.thickness >= 0.0) {
            return fail(format!("plane thickness must be >= 0, got {}", self.plane.thickness));
        }
        if self.interface.n_clouds_per_recognition == 0 {
            return fail("n_clouds_per_recognition must be at least 1".to_string());
        }
        if !(self.interface.downsample_voxel_size >= 0.0) {
            return fail(format!(
                "downsample_voxel_size must be >= 0, got {}",
                self.interface.downsample_voxel_size
            ));
        }
        let multiplier = self.interface.confidence_time_multiplier;
        if !(multiplier.is_finite() && multiplier >= 0.0) {
            return fail(format!(
                "confidence_time_multiplier must be finite and >= 0, got {}",
                self.interface.confidence_time_multiplier
            ));
        }
        for (axis, bounds) in ["x", "y", "z"].iter().zip(self.roi.axes()) {
            if !bounds.is_valid() {
                return fail(format!(
                    "{axis} clip bounds must satisfy min < max, got [{}, {}]",
                    bounds.min, bounds.max
                ));
            }
        }
        Ok(())
    }
}

/// Partial update of [`RuntimeParams`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconfigureRequest {
    pub object_visibility: Option<f64>,
    pub relative_object_size: Option<f64>,
    pub relative_number_of_illegal_points: Option<f64>,
    pub z_distance_threshold_as_voxel_size_fraction: Option<f64>,
    pub normal_estimation_radius: Option<u32>,
    pub intersection_fraction: Option<f64>,
    pub num_threads: Option<u32>,
    pub success_probability: Option<f64>,

    pub plane_thickness: Option<f64>,
    pub use_only_points_above_plane: Option<bool>,
    pub rel_num_of_plane_points: Option<f64>,

    pub publish_markers: Option<bool>,
    pub n_clouds_per_recognition: Option<usize>,
    pub downsample_voxel_size: Option<f64>,
    pub confidence_time_multiplier: Option<f64>,

    pub x_clip_min: Option<f32>,
    pub x_clip_max: Option<f32>,
    pub y_clip_min: Option<f32>,
    pub y_clip_max: Option<f32>,
    pub z_clip_min: Option<f32>,
    pub z_clip_max: Option<f32>,
}

impl ReconfigureRequest {
    /// Merge this request into `current`.
    pub fn apply_to(&self, current: &RuntimeParams) -> RuntimeParams {
        fn set<T: Copy>(field: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *field = v;
            }
        }

        let mut p = current.clone();
        set(&mut p.engine.object_visibility, self.object_visibility);
        set(&mut p.engine.relative_object_size, self.relative_object_size);
        set(
            &mut p.engine.relative_number_of_illegal_points,
            self.relative_number_of_illegal_points,
        );
        set(
            &mut p.engine.z_distance_threshold_as_voxel_size_fraction,
            self.z_distance_threshold_as_voxel_size_fraction,
        );
        set(&mut p.engine.normal_estimation_radius, self.normal_estimation_radius);
        set(&mut p.engine.intersection_fraction, self.intersection_fraction);
        set(&mut p.engine.num_threads, self.num_threads);
        set(&mut p.success_probability, self.success_probability);

        set(&mut p.plane.thickness, self.plane_thickness);
        set(
            &mut p.plane.use_only_points_above_plane,
            self.use_only_points_above_plane,
        );
        set(&mut p.plane.rel_num_of_plane_points, self.rel_num_of_plane_points);

        set(&mut p.interface.publish_markers, self.publish_markers);
        set(
            &mut p.interface.n_clouds_per_recognition,
            self.n_clouds_per_recognition,
        );
        set(&mut p.interface.downsample_voxel_size, self.downsample_voxel_size);
        set(
            &mut p.interface.confidence_time_multiplier,
            self.confidence_time_multiplier,
        );

        set(&mut p.roi.x_min, self.x_clip_min);
        set(&mut p.roi.x_max, self.x_clip_max);
        set(&mut p.roi.y_min, self.y_clip_min);
        set(&mut p.roi.y_max, self.y_clip_max);
        set(&mut p.roi.z_min, self.z_clip_min);
        set(&mut p.roi.z_max, self.z_clip_max);
        p
    }
}

/// Shared handle to the current parameter snapshot.
#[derive(Debug, Clone)]
pub struct SharedParams {
    inner: Arc<RwLock<Arc<RuntimeParams>>>,
}

impl SharedParams {
    /// Create a handle holding `params`.
    pub fn new(params: RuntimeParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(params))),
        }
    }

    /// Current snapshot. Cheap; the read lock is held only to clone the
    /// `Arc`.
    pub fn snapshot(&self) -> Arc<RuntimeParams> {
        Arc::clone(&self.inner.read())
    }

    /// Merge and install a reconfiguration.
    ///
    /// The merged set is validated first; an invalid request leaves the
    /// current snapshot untouched.
    pub fn reconfigure(&self, request: &ReconfigureRequest) -> Result<Arc<RuntimeParams>> {
        let mut guard = self.inner.write();
        let updated = request.apply_to(&guard);
        updated.validate()?;
        let updated = Arc::new(updated);
        *guard = Arc::clone(&updated);
        Ok(updated)
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(RuntimeParams {
            success_probability: 0.99,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn params() -> RuntimeParams {
        RuntimeParams {
            success_probability: 0.99,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        params().validate().unwrap();
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let base = params();
        let request = ReconfigureRequest {
            plane_thickness: Some(25.0),
            num_threads: Some(4),
            x_clip_min: Some(-0.5),
            ..Default::default()
        };

        let updated = request.apply_to(&base);

        assert_eq!(updated.plane.thickness, 25.0);
        assert_eq!(updated.engine.num_threads, 4);
        assert_eq!(updated.roi.x_min, -0.5);
        assert_eq!(updated.roi.x_max, base.roi.x_max);
        assert_eq!(updated.interface, base.interface);
        assert_eq!(updated.success_probability, base.success_probability);
    }

    #[test]
    fn test_invalid_request_rejected() {
        let shared = SharedParams::new(params());
        let before = shared.snapshot();

        let bad = ReconfigureRequest {
            success_probability: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(shared.reconfigure(&bad), Err(Error::Config(_))));

        let inverted = ReconfigureRequest {
            z_clip_min: Some(2.0),
            z_clip_max: Some(1.0),
            ..Default::default()
        };
        assert!(shared.reconfigure(&inverted).is_err());

        let endless = ReconfigureRequest {
            confidence_time_multiplier: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(shared.reconfigure(&endless).is_err());

        assert_eq!(*shared.snapshot(), *before);
    }

    #[test]
    fn test_snapshot_is_stable_across_reconfigure() {
        let shared = SharedParams::new(params());
        let held = shared.snapshot();

        shared
            .reconfigure(&ReconfigureRequest {
                downsample_voxel_size: Some(10.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(held.interface.downsample_voxel_size, 3.5);
        assert_eq!(shared.snapshot().interface.downsample_voxel_size, 10.0);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_update() {
        let mut base = params();
        base.engine.num_threads = 1;
        base.interface.n_clouds_per_recognition = 1;
        let shared = SharedParams::new(base);
        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..200u32 {
                    let v = 1 + i % 2;
                    shared
                        .reconfigure(&ReconfigureRequest {
                            num_threads: Some(v),
                            n_clouds_per_recognition: Some(v as usize),
                            ..Default::default()
                        })
                        .unwrap();
                }
            })
        };

        for _ in 0..1000 {
            let p = shared.snapshot();
            assert_eq!(p.engine.num_threads as usize, p.interface.n_clouds_per_recognition);
        }
        writer.join().unwrap();
    }
}
