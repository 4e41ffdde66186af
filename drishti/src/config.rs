//! Configuration for the recognition node.
//!
//! Loaded from a TOML file. `[recognition]` and `[plane]` are required and
//! have no defaults; a missing key there is a fatal configuration error.
//! Every other section falls back to defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::algorithms::segmentation::{PlaneParams, RansacPlaneConfig};
use crate::engine::{
    EngineConstruction, EngineParams, ModelConfig, ResourceRetriever, StaticTransformConfig,
};
use crate::error::{Error, Result};
use crate::io::ReplayConfig;
use crate::sensors::preprocessing::RegionOfInterestConfig;
use crate::state::{InterfaceParams, RuntimeParams};
use crate::threads::SchedulerConfig;

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub recognition: RecognitionConfig,
    pub plane: PlaneParams,
    #[serde(default)]
    pub interface: InterfaceConfig,
    #[serde(default)]
    pub roi: RegionOfInterestConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub ransac: RansacPlaneConfig,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub transforms: Vec<StaticTransformConfig>,
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Recognition engine parameters (all required)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RecognitionConfig {
    /// Oriented point pair width (millimetres)
    pub pair_width: f64,
    /// Engine voxel size (millimetres)
    pub voxel_size: f64,
    pub object_visibility: f64,
    pub relative_object_size: f64,
    pub relative_number_of_illegal_points: f64,
    pub z_distance_threshold_as_voxel_size_fraction: f64,
    pub normal_estimation_radius: u32,
    pub intersection_fraction: f64,
    pub num_threads: u32,
    /// Desired probability of detecting every present object
    pub success_probability: f64,
}

impl RecognitionConfig {
    /// Parameters fixed at engine construction.
    pub fn construction(&self) -> EngineConstruction {
        EngineConstruction {
            pair_width: self.pair_width,
            voxel_size: self.voxel_size,
        }
    }

    /// Parameters applied after construction.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            object_visibility: self.object_visibility,
            relative_object_size: self.relative_object_size,
            relative_number_of_illegal_points: self.relative_number_of_illegal_points,
            z_distance_threshold_as_voxel_size_fraction: self
                .z_distance_threshold_as_voxel_size_fraction,
            normal_estimation_radius: self.normal_estimation_radius,
            intersection_fraction: self.intersection_fraction,
            num_threads: self.num_threads,
        }
    }
}

/// Buffering, downsampling and output settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InterfaceConfig {
    pub publish_markers: bool,
    /// Frame buffer depth
    pub n_clouds_per_recognition: usize,
    /// Aggregation voxel size (millimetres)
    pub downsample_voxel_size: f64,
    /// Marker lifetime per unit of confidence (seconds)
    pub confidence_time_multiplier: f64,
    /// Frame detections are re-expressed in
    pub world_frame: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        let params = InterfaceParams::default();
        Self {
            publish_markers: params.publish_markers,
            n_clouds_per_recognition: params.n_clouds_per_recognition,
            downsample_voxel_size: params.downsample_voxel_size,
            confidence_time_multiplier: params.confidence_time_multiplier,
            world_frame: "/world".to_string(),
        }
    }
}

impl InterfaceConfig {
    /// Reconfigurable part.
    pub fn params(&self) -> InterfaceParams {
        InterfaceParams {
            publish_markers: self.publish_markers,
            n_clouds_per_recognition: self.n_clouds_per_recognition,
            downsample_voxel_size: self.downsample_voxel_size,
            confidence_time_multiplier: self.confidence_time_multiplier,
        }
    }
}

/// Package roots for `package://` URIs
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub packages: HashMap<String, PathBuf>,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use drishti::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("drishti.toml")?;
    /// # Ok::<(), drishti::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let r = &self.recognition;
        if !(r.pair_width > 0.0) {
            return Err(Error::Config(format!("pair_width must be > 0, got {}", r.pair_width)));
        }
        if !(r.voxel_size > 0.0) {
            return Err(Error::Config(format!("voxel_size must be > 0, got {}", r.voxel_size)));
        }
        if !(self.ransac.distance_threshold > 0.0) {
            return Err(Error::Config(format!(
                "ransac.distance_threshold must be > 0, got {}",
                self.ransac.distance_threshold
            )));
        }
        if !(self.ransac.probability > 0.0 && self.ransac.probability < 1.0) {
            return Err(Error::Config(format!(
                "ransac.probability must be in (0, 1), got {}",
                self.ransac.probability
            )));
        }
        if self.ransac.max_iterations == 0 {
            return Err(Error::Config("ransac.max_iterations must be at least 1".to_string()));
        }
        if !(self.scheduler.max_rate_hz > 0.0) {
            return Err(Error::Config(format!(
                "scheduler.max_rate_hz must be > 0, got {}",
                self.scheduler.max_rate_hz
            )));
        }
        for model in &self.models {
            if model.label.is_empty() {
                return Err(Error::Config(format!(
                    "model with URI {} has an empty label",
                    model.model_uri
                )));
            }
        }
        self.runtime_params().validate()
    }

    /// Initial live-reconfigurable parameter set
    pub fn runtime_params(&self) -> RuntimeParams {
        RuntimeParams {
            engine: self.recognition.engine_params(),
            success_probability: self.recognition.success_probability,
            plane: self.plane,
            roi: self.roi,
            interface: self.interface.params(),
        }
    }

    /// Resource retriever with the configured package roots
    pub fn retriever(&self) -> ResourceRetriever {
        self.resources
            .packages
            .iter()
            .fold(ResourceRetriever::new(), |r, (name, root)| {
                r.with_package(name.clone(), root.clone())
            })
    }
}
