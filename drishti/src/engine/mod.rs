//! Recognition layer.
//!
//! # Contents
//!
//! - [`recognizer`]: engine contract, raw matches, engine parameters
//! - [`driver`]: per-tick engine invocation and result conversion
//! - [`registry`]: startup model registry
//! - [`resource`]: URI resolution for model files
//! - [`transform`]: frame transform lookup

pub mod driver;
pub mod recognizer;
pub mod registry;
pub mod resource;
pub mod transform;

pub use driver::{DetectionRecord, RecognitionDriver};
pub use recognizer::{
    EngineConstruction, EngineParams, EngineStats, NullEngine, RawMatch, RecognitionEngine,
};
pub use registry::{ModelConfig, ModelEntry, ModelGeometry, ModelRegistry};
pub use resource::ResourceRetriever;
pub use transform::{StaticTransformConfig, StaticTransforms, TransformLookup};
