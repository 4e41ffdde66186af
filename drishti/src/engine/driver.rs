//! Recognition driver.
//!
//! Runs the engine once per tick on the foreground cloud and turns its raw
//! matches into detection records with metric, world-frame poses.

use std::sync::Arc;

use nalgebra::Point3;

use super::recognizer::{EngineParams, RawMatch, RecognitionEngine};
use super::registry::ModelRegistry;
use super::transform::TransformLookup;
use crate::core::types::{FrameHeader, PointCloud, Pose3D, RigidTransform};
use crate::core::units::m_to_mm;
use crate::error::Result;

/// One recognised object instance for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    /// Model label
    pub label: String,
    /// Engine score, larger is better
    pub confidence: f64,
    /// Pose in metres, expressed in `frame_id`
    pub pose: Pose3D,
    /// Frame of `pose`: the world frame, or the sensor frame when the
    /// transform lookup failed
    pub frame_id: String,
    /// Capture time of the cloud the detection came from
    pub stamp_us: u64,
}

/// Owns the engine and converts its output.
pub struct RecognitionDriver {
    engine: Box<dyn RecognitionEngine>,
    transforms: Arc<dyn TransformLookup>,
    world_frame: String,
    applied: Option<EngineParams>,
    model_count: usize,
}

impl RecognitionDriver {
    /// Create a driver and register every model of `registry` with the
    /// engine. A model the engine rejects is logged and left out.
    pub fn new(
        mut engine: Box<dyn RecognitionEngine>,
        registry: &ModelRegistry,
        transforms: Arc<dyn TransformLookup>,
        world_frame: impl Into<String>,
    ) -> Self {
        let mut model_count = 0;
        for model in registry.iter() {
            match engine.add_model(&model.label, &model.geometry.points_mm) {
                Ok(()) => model_count += 1,
                Err(e) => log::error!("Engine rejected model \"{}\": {}", model.label, e),
            }
        }
        log::info!(
            "Recognition engine '{}' ready with {} model(s)",
            engine.name(),
            model_count
        );

        Self {
            engine,
            transforms,
            world_frame: world_frame.into(),
            applied: None,
            model_count,
        }
    }

    /// Number of models the engine accepted.
    pub fn model_count(&self) -> usize {
        self.model_count
    }

    /// Apply `params` to the engine if they differ from the last applied
    /// set. Returns true when the engine was updated.
    pub fn sync_params(&mut self, params: &EngineParams) -> bool {
        if self.applied.as_ref() == Some(params) {
            return false;
        }
        self.engine.apply_params(params);
        self.applied = Some(*params);
        log::debug!("Applied engine parameters: {:?}", params);
        true
    }

    /// Recognise objects in `foreground` (metres).
    ///
    /// Consumes the cloud; every returned record is fully formed.
    pub fn recognize(
        &mut self,
        foreground: PointCloud,
        success_probability: f64,
    ) -> Result<Vec<DetectionRecord>> {
        let header = foreground.header;
        let scene_mm: Vec<Point3<f64>> = foreground
            .points
            .iter()
            .map(|p| {
                let [x, y, z] = p.position_f64();
                Point3::new(m_to_mm(x), m_to_mm(y), m_to_mm(z))
            })
            .collect();

        let matches = self.engine.recognize(&scene_mm, success_probability)?;

        if let Some(stats) = self.engine.last_stats() {
            log::debug!(
                "Recognition took {:.3}s, {} hypotheses ({:?} per hypothesis)",
                stats.recognition_time.as_secs_f64(),
                stats.hypotheses_checked,
                stats.time_per_hypothesis()
            );
        }

        Ok(matches
            .into_iter()
            .map(|m| self.convert(m, &header))
            .collect())
    }

    /// Convert one raw match, re-expressing it in the world frame when a
    /// transform is available.
    fn convert(&self, raw: RawMatch, header: &FrameHeader) -> DetectionRecord {
        let pose = RigidTransform::from_row_major(&raw.transform).to_pose();

        let lookup = self
            .transforms
            .lookup(&self.world_frame, &header.frame_id, header.stamp_us);
        let (pose, frame_id) = match lookup {
            Ok(world_from_sensor) => (
                pose.transformed_by(&world_from_sensor),
                self.world_frame.clone(),
            ),
            Err(e) => {
                log::warn!("Not transforming recognized objects into world frame: {}", e);
                (pose, header.frame_id.clone())
            }
        };

        DetectionRecord {
            label: raw.label,
            confidence: raw.confidence,
            pose,
            frame_id,
            stamp_us: header.stamp_us,
        }
    }
}

impl std::fmt::Debug for RecognitionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionDriver")
            .field("engine", &self.engine.name())
            .field("world_frame", &self.world_frame)
            .field("applied", &self.applied)
            .finish()
    }
}
