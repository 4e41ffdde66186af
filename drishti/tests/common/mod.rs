//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use nalgebra::{Isometry3, Point3};
use parking_lot::Mutex;

use drishti::algorithms::segmentation::{RansacPlaneConfig, SurfaceRemover};
use drishti::engine::{
    EngineParams, ModelEntry, ModelGeometry, ModelRegistry, RawMatch, RecognitionDriver,
    RecognitionEngine, StaticTransforms,
};
use drishti::io::{ChannelSink, FrameBuffer, PublishedMessage, ResultPublisher};
use drishti::state::{RuntimeParams, SharedParams};
use drishti::threads::RecognitionPipeline;
use drishti::{Error, FrameHeader, PlaneParams, PointCloud, PointXYZRGB, Result};

pub const SENSOR_FRAME: &str = "/camera_depth_optical_frame";
pub const WORLD_FRAME: &str = "/world";

/// What the scripted engine saw.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub models: Vec<String>,
    pub scenes: Vec<Vec<Point3<f64>>>,
    pub params: Vec<EngineParams>,
    pub probabilities: Vec<f64>,
}

/// Engine replaying a fixed answer and recording its inputs.
pub struct ScriptedEngine {
    pub matches: Vec<RawMatch>,
    pub fail: bool,
    pub log: Arc<Mutex<EngineLog>>,
}

impl ScriptedEngine {
    pub fn new(matches: Vec<RawMatch>) -> (Self, Arc<Mutex<EngineLog>>) {
        let log = Arc::new(Mutex::new(EngineLog::default()));
        (
            Self {
                matches,
                fail: false,
                log: Arc::clone(&log),
            },
            log,
        )
    }

    pub fn failing() -> (Self, Arc<Mutex<EngineLog>>) {
        let (mut engine, log) = Self::new(Vec::new());
        engine.fail = true;
        (engine, log)
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn add_model(&mut self, label: &str, _points_mm: &[Point3<f64>]) -> Result<()> {
        self.log.lock().models.push(label.to_string());
        Ok(())
    }

    fn apply_params(&mut self, params: &EngineParams) {
        self.log.lock().params.push(*params);
    }

    fn recognize(&mut self, scene_mm: &[Point3<f64>], success_probability: f64) -> Result<Vec<RawMatch>> {
        let mut log = self.log.lock();
        log.scenes.push(scene_mm.to_vec());
        log.probabilities.push(success_probability);
        if self.fail {
            return Err(Error::Engine("scripted failure".to_string()));
        }
        Ok(self.matches.clone())
    }
}

/// Identity rotation with a translation in millimetres.
pub fn raw_match(label: &str, confidence: f64, t_mm: [f64; 3]) -> RawMatch {
    RawMatch {
        label: label.to_string(),
        confidence,
        transform: [
            1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, t_mm[0], t_mm[1], t_mm[2],
        ],
    }
}

/// 12x12 grid on the z = `z` plane, 6.25 cm spacing.
pub fn table(z: f32) -> Vec<PointXYZRGB> {
    let mut points = Vec::with_capacity(144);
    for i in 0..12 {
        for j in 0..12 {
            points.push(PointXYZRGB::new(i as f32 * 0.0625, j as f32 * 0.0625, z));
        }
    }
    points
}

pub fn cloud(stamp_us: u64, points: Vec<PointXYZRGB>) -> PointCloud {
    PointCloud::from_points(FrameHeader::new(stamp_us, SENSOR_FRAME), points)
}

pub fn registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry
        .insert(ModelEntry {
            label: "mug".to_string(),
            geometry: ModelGeometry {
                points_mm: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)],
            },
            mesh_uri: "package://objects/mug.stl".to_string(),
        })
        .unwrap();
    registry
}

pub fn params() -> RuntimeParams {
    RuntimeParams {
        success_probability: 0.99,
        plane: PlaneParams {
            thickness: 20.0,
            use_only_points_above_plane: true,
            rel_num_of_plane_points: 0.2,
        },
        ..Default::default()
    }
}

pub fn remover() -> SurfaceRemover {
    SurfaceRemover::new(RansacPlaneConfig {
        optimize_coefficients: false,
        seed: 7,
        ..Default::default()
    })
}

/// Everything a test needs to drive and observe one pipeline.
pub struct Harness {
    pub pipeline: RecognitionPipeline,
    pub buffer: Arc<FrameBuffer>,
    pub params: SharedParams,
    pub engine_log: Arc<Mutex<EngineLog>>,
    pub output: crossbeam_channel::Receiver<PublishedMessage>,
}

/// Pipeline with the sensor frame mounted at `sensor_in_world` (or no
/// transform at all).
pub fn harness(engine: ScriptedEngine, sensor_in_world: Option<Isometry3<f64>>) -> Harness {
    let engine_log = Arc::clone(&engine.log);
    let buffer = Arc::new(FrameBuffer::new(1));
    let params = SharedParams::new(params());

    let mut transforms = StaticTransforms::new();
    if let Some(iso) = sensor_in_world {
        transforms.insert(WORLD_FRAME, SENSOR_FRAME, iso);
    }

    let registry = Arc::new(registry());
    let driver = RecognitionDriver::new(
        Box::new(engine),
        &registry,
        Arc::new(transforms),
        WORLD_FRAME,
    );
    let (sink, output) = ChannelSink::new();
    let publisher = ResultPublisher::new(Box::new(sink), registry, WORLD_FRAME);

    let pipeline = RecognitionPipeline::new(
        Arc::clone(&buffer),
        params.clone(),
        remover(),
        driver,
        publisher,
    );

    Harness {
        pipeline,
        buffer,
        params,
        engine_log,
        output,
    }
}

/// Every message published so far.
pub fn published(rx: &crossbeam_channel::Receiver<PublishedMessage>) -> Vec<PublishedMessage> {
    rx.try_iter().collect()
}
