//! Recognition engine contract.
//!
//! The matching engine is an external collaborator. It works in
//! millimetres: model geometry, scene points and the translation of every
//! returned match. Results come back as an owned vector, so a match's
//! lifetime ends when the driver has converted it.

use std::time::Duration;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters fixed when the engine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConstruction {
    /// Oriented point pair width (millimetres)
    pub pair_width: f64,
    /// Base voxel size of the scene octree (millimetres)
    pub voxel_size: f64,
}

/// Parameters re-applied to the engine whenever they change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Expected visible fraction of an object, in [0, 1]
    pub object_visibility: f64,
    /// Object size relative to the scene, in [0, 1]
    pub relative_object_size: f64,
    /// Tolerated fraction of model points lying in front of the scene
    pub relative_number_of_illegal_points: f64,
    /// Depth tolerance as a multiple of the voxel size
    pub z_distance_threshold_as_voxel_size_fraction: f64,
    /// Normal estimation radius (voxels)
    pub normal_estimation_radius: u32,
    /// Overlap fraction above which two hypotheses conflict
    pub intersection_fraction: f64,
    /// Worker threads inside the engine
    pub num_threads: u32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            object_visibility: 0.1,
            relative_object_size: 0.1,
            relative_number_of_illegal_points: 0.02,
            z_distance_threshold_as_voxel_size_fraction: 1.5,
            normal_estimation_radius: 5,
            intersection_fraction: 0.03,
            num_threads: 2,
        }
    }
}

/// One raw match as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    /// Label of the matched model
    pub label: String,
    /// Engine-defined score, larger is better
    pub confidence: f64,
    /// Row-major 3x3 rotation followed by translation in millimetres
    pub transform: [f64; 12],
}

/// Timing of the last recognition call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineStats {
    pub recognition_time: Duration,
    pub hypotheses_checked: u64,
}

impl EngineStats {
    /// Mean time per checked hypothesis.
    pub fn time_per_hypothesis(&self) -> Option<Duration> {
        let n = u32::try_from(self.hypotheses_checked).ok().filter(|&n| n > 0)?;
        Some(self.recognition_time / n)
    }
}

/// Trait for model-based recognition engines.
pub trait RecognitionEngine: Send {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Register a model point set (millimetres) under `label`.
    fn add_model(&mut self, label: &str, points_mm: &[Point3<f64>]) -> Result<()>;

    /// Apply post-construction parameters.
    fn apply_params(&mut self, params: &EngineParams);

    /// Recognise registered models in a scene given in millimetres.
    ///
    /// # Arguments
    /// * `scene_mm` - Foreground points in millimetres
    /// * `success_probability` - Desired probability of detecting every
    ///   present object
    fn recognize(
        &mut self,
        scene_mm: &[Point3<f64>],
        success_probability: f64,
    ) -> Result<Vec<RawMatch>>;

    /// Statistics of the last `recognize` call, if the engine keeps any.
    fn last_stats(&self) -> Option<EngineStats> {
        None
    }
}

/// Engine that knows its models but never reports a match.
///
/// Used when no matching backend is linked, so the rest of the pipeline
/// (buffering, segmentation, publishing) still runs.
#[derive(Debug, Default)]
pub struct NullEngine {
    construction: Option<EngineConstruction>,
    params: EngineParams,
    models: Vec<String>,
    last: Option<EngineStats>,
}

impl NullEngine {
    /// Create an engine with the given construction parameters.
    pub fn new(construction: EngineConstruction) -> Self {
        Self {
            construction: Some(construction),
            ..Default::default()
        }
    }

    /// Registered model labels.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Last applied parameters.
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Construction parameters, if any were given.
    pub fn construction(&self) -> Option<&EngineConstruction> {
        self.construction.as_ref()
    }
}

impl RecognitionEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn add_model(&mut self, label: &str, points_mm: &[Point3<f64>]) -> Result<()> {
        if points_mm.is_empty() {
            return Err(Error::Engine(format!("model '{label}' has no points")));
        }
        self.models.push(label.to_string());
        Ok(())
    }

    fn apply_params(&mut self, params: &EngineParams) {
        self.params = *params;
    }

    fn recognize(
        &mut self,
        _scene_mm: &[Point3<f64>],
        _success_probability: f64,
    ) -> Result<Vec<RawMatch>> {
        self.last = Some(EngineStats::default());
        Ok(Vec::new())
    }

    fn last_stats(&self) -> Option<EngineStats> {
        self.last
    }
}
